use crate::model::BookmarkParseResult;
use uuid::Uuid;

#[derive(Debug)]
pub enum Action {
    SaveImport,
    Quit,
}

#[derive(Debug)]
pub enum AppEvent {
    Parsed(Box<BookmarkParseResult>),
    Saved(Uuid),
    Error(String),
    Status(String),
}

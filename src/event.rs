use crate::{domain::Gist, result::GistrError};

/// Completion signals delivered to whoever renders the gists
#[derive(Debug, Clone)]
pub enum GistEvent {
    AppError(GistrError),
    GistsFetched(Vec<Gist>),
}

pub trait IntoGistEvent {
    fn into_gist_event(self) -> GistEvent;
}

impl IntoGistEvent for Vec<Gist> {
    fn into_gist_event(self) -> GistEvent {
        GistEvent::GistsFetched(self)
    }
}

impl From<GistrError> for GistEvent {
    fn from(error: GistrError) -> Self {
        GistEvent::AppError(error)
    }
}

use uuid::Uuid;

/// The authenticated party behind a request.
///
/// Anonymous requests are represented as `Option<&Viewer>::None` wherever a
/// viewer is expected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewer {
    pub user_id: Uuid,
    pub is_superuser: bool,
}

impl Viewer {
    pub fn new(user_id: Uuid, is_superuser: bool) -> Self {
        Self {
            user_id,
            is_superuser,
        }
    }

    /// Whether this viewer is the given (possibly absent) author.
    pub fn is(&self, author_id: Option<Uuid>) -> bool {
        author_id == Some(self.user_id)
    }
}

/// An authenticated identity that can take part in single-session
/// enforcement.
///
/// Implementing the trait is the opt-in.  `single_session` lets a type
/// opt individual identities out (service accounts, say) without the
/// hooks having to guess.
pub trait SingleSessionSubject {
    /// Stable identifier the authority keys sessions by.
    fn subject_id(&self) -> &str;

    fn single_session(&self) -> bool {
        true
    }
}

impl SingleSessionSubject for str {
    fn subject_id(&self) -> &str {
        self
    }
}

impl SingleSessionSubject for String {
    fn subject_id(&self) -> &str {
        self
    }
}

use std::path::Path;

/// Guesses a content type for a file when the caller did not supply one.
pub trait ContentTypeSniffer: Send + Sync {
    fn sniff(&self, path: &Path) -> Option<String>;
}

impl<F> ContentTypeSniffer for F
where
    F: Fn(&Path) -> Option<String> + Send + Sync,
{
    fn sniff(&self, path: &Path) -> Option<String> {
        self(path)
    }
}

/// Looks the content type up from the file extension with [`mime_guess`].
#[derive(Debug, Clone, Copy, Default)]
pub struct GuessFromExtension;

impl ContentTypeSniffer for GuessFromExtension {
    fn sniff(&self, path: &Path) -> Option<String> {
        mime_guess::from_path(path).first_raw().map(str::to_string)
    }
}

/// An explicit type wins over the sniffer. `None` leaves the choice of
/// default to [`crate::resolve`].
pub fn resolve_mime(
    requested: Option<&str>,
    sniffer: Option<&dyn ContentTypeSniffer>,
    path: &Path,
) -> Option<String> {
    match requested {
        Some(mime) => Some(mime.to_string()),
        None => sniffer.and_then(|sniffer| sniffer.sniff(path)),
    }
}

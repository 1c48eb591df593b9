/// Where a logical plist name is resolved.
///
/// `MainBundle` is read-only: saving or checking writability there fails with
/// `InvalidArgument`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Location {
    /// `<documents dir>/<name>.plist`
    #[default]
    DocumentsDir,
    /// The `<name>.plist` resource of the application bundle.
    MainBundle,
    /// The name is a complete file system path, used as given.
    ExplicitPath,
}

impl Location {
    pub fn is_writable_location(self) -> bool {
        !matches!(self, Location::MainBundle)
    }
}

impl std::fmt::Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Location::DocumentsDir => "documents directory",
            Location::MainBundle => "main bundle",
            Location::ExplicitPath => "explicit path",
        };
        write!(f, "{}", name)
    }
}

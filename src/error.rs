use std::fmt;

/// Which linking stage a failure occurred in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkStage {
    Static,
    Shared,
}

impl fmt::Display for LinkStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LinkStage::Static => write!(f, "static"),
            LinkStage::Shared => write!(f, "shared"),
        }
    }
}

/// Error type for the build core.
///
/// Configuration errors are raised before any build work starts; compile and
/// link errors abort the library being built and halt the remaining sequence;
/// publish errors surface after all libraries otherwise succeeded. Nothing in
/// this crate retries a failed external operation.
#[derive(Debug)]
pub enum BuildError {
    /// Malformed library descriptor or manifest.
    Configuration(String),
    /// No usable compiler/archiver found on this host.
    Toolchain(String),
    /// The compiler rejected one of the library's sources.
    Compile { library: String, message: String },
    /// The archiver or linker failed.
    Link {
        library: String,
        stage: LinkStage,
        message: String,
    },
    /// Copying a shared artifact to the publish directory failed.
    Publish(String),
    /// Filesystem error outside the stages above.
    Io(std::io::Error),
}

impl fmt::Display for BuildError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BuildError::Configuration(msg) => write!(f, "configuration error: {}", msg),
            BuildError::Toolchain(msg) => write!(f, "toolchain error: {}", msg),
            BuildError::Compile { library, message } => {
                write!(f, "compiling library '{}' failed: {}", library, message)
            }
            BuildError::Link {
                library,
                stage,
                message,
            } => write!(
                f,
                "linking library '{}' ({} stage) failed: {}",
                library, stage, message
            ),
            BuildError::Publish(msg) => write!(f, "publishing artifacts failed: {}", msg),
            BuildError::Io(e) => write!(f, "IO error: {}", e),
        }
    }
}

impl std::error::Error for BuildError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            BuildError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for BuildError {
    fn from(e: std::io::Error) -> Self {
        BuildError::Io(e)
    }
}

pub type Result<T> = std::result::Result<T, BuildError>;

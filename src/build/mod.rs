mod clean;
mod core;

pub use self::clean::clean;
pub use self::core::{BuildContext, BuiltLibrary, build_libraries, link_library};

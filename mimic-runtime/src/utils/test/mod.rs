pub use self::memory::*;

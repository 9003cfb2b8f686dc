use crate::provider::Provider;
use crate::traits::{FileSystem, Output, RealFileSystem, TerminalOutput};
#[cfg(test)]
use crate::traits::{MockFileSystem, MockOutput};
use std::sync::Arc;

/// Application context that holds all dependencies for dependency injection
pub struct Context {
    pub fs: Arc<dyn FileSystem>,
    pub output: Arc<dyn Output>,
    pub provider: Arc<Provider>,
}

impl Context {
    /// Create a new context with real implementations (for production use)
    pub fn new() -> Self {
        Self {
            fs: Arc::new(RealFileSystem),
            output: Arc::new(TerminalOutput),
            provider: Arc::new(Provider::new()),
        }
    }

    /// Create a new context with mock implementations (for testing)
    #[cfg(test)]
    pub fn test() -> Self {
        Self::test_with(Arc::new(MockFileSystem::new()), Arc::new(MockOutput::new()))
    }

    /// Create a test context with specific mock implementations
    #[cfg(test)]
    pub fn test_with(fs: Arc<dyn FileSystem>, output: Arc<dyn Output>) -> Self {
        Self {
            fs,
            output,
            provider: Arc::new(Provider::new()),
        }
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for Context {
    fn clone(&self) -> Self {
        Self {
            fs: Arc::clone(&self.fs),
            output: Arc::clone(&self.output),
            provider: Arc::clone(&self.provider),
        }
    }
}

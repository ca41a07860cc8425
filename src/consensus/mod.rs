pub mod http;
pub mod registry;
pub mod resolver;

pub use http::HttpChainSource;
pub use registry::NodeRegistry;
pub use resolver::ConsensusResolver;

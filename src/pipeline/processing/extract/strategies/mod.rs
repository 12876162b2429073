// Markup helpers shared by all strategies
pub mod html;

// Site-family strategies
pub mod code_hosting;
pub mod generic;
pub mod listing;
pub mod portfolio;

pub use code_hosting::CodeHostingStrategy;
pub use generic::GenericStrategy;
pub use listing::ListingStrategy;
pub use portfolio::PortfolioStrategy;

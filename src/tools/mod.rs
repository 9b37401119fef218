//! External capabilities used by the retrieval step.
//!
//! - [`search`](crate::tools::search) - Web search and page scraping (DuckDuckGo via daedra)
//!
//! ```ignore
//! let web = DaedraWeb::new(10);
//! let hits = web.search("rust async runtimes").await?;
//! let page = web.scrape(&hits[0].url).await;
//! ```

/// Web search and page scraping.
pub mod search;

pub use search::{DaedraWeb, PageScraper, SearchHit, WebSearch};

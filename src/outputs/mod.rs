//! Output generation for the drama dataset.
//!
//! # Submodules
//!
//! - [`csv`]: reads and writes the dataset as a comma-separated file
//!
//! # Output Structure
//!
//! ```text
//! data/
//! ├── kdrama_list.csv             # scrape (IMDb + Wikipedia columns)
//! ├── kdrama_list_with_wiki.csv   # enrich of an existing CSV
//! └── wikipedia_list.json         # title -> article URL input
//! ```

pub mod csv;

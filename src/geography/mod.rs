//! Country and continent geography.

mod graph;
mod table;

pub use graph::ContinentGraph;
pub use table::{
    builtin_country_continents, load_country_continent_csv, parse_country_continent_csv,
    COUNTRY_CONTINENTS,
};

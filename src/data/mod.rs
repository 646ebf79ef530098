/// Data layer: entity model, loading, linking, and filtering.
///
/// Architecture:
/// ```text
///  neos.csv        cad.json
///      │               │
///      ▼               ▼
///   ┌──────────────────────┐
///   │        loader        │  parse files → Vec<NearEarthObject>, Vec<CloseApproach>
///   └──────────────────────┘
///             │
///             ▼
///   ┌──────────────────────┐
///   │     NeoDatabase      │  designation index, approach ↔ object links
///   └──────────────────────┘
///             │
///             ▼
///   ┌──────────────────────┐
///   │        filter        │  criteria → predicates, lazy query, limit
///   └──────────────────────┘
/// ```

pub mod database;
pub mod filter;
pub mod loader;
pub mod model;

/// Data layer: channel table, parsing, and summary statistics.
///
/// Architecture:
/// ```text
///   AeH25Jan.15m.txt
///        │
///        ▼
///   ┌──────────┐
///   │  parser   │  header / #End / rows → Series
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  Series   │  Vec<Sample>, fixed channel table
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │ summary   │  span, counts, positive flux range
///   └──────────┘
/// ```

pub mod model;
pub mod parser;
pub mod summary;

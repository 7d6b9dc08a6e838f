//! Configuration section definitions.
//!
//! Each module corresponds to a section in `whitelabel.toml`:
//!
//! | Module     | TOML Section   | Purpose                                  |
//! |------------|----------------|------------------------------------------|
//! | `rules`    | `[[rules]]`    | Selector → replacement content           |
//! | `fixups`   | `[fixups]`     | Video, placeholder, image, logo fixes    |
//! | `observe`  | `[observe]`    | Attribute filter, scroll debounce, turns |
//! | `localize` | `[localize]`   | Local asset folders                      |

mod fixups;
mod localize;
mod observe;
mod rules;

pub use fixups::{FixupsConfig, PlaceholderFixup, SrcFixup};
pub use localize::LocalizeConfig;
pub use observe::ObserveConfig;
pub use rules::{ContentRule, validate_rules};

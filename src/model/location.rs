// SPDX-FileCopyrightText: 2025 Robin Vobruba <hoijui.quaero@gmail.com>
//
// SPDX-License-Identifier: AGPL-3.0-or-later

use std::collections::HashMap;
use strum::{Display, EnumIter, EnumString, IntoEnumIterator, IntoStaticStr};

/// An archive or portal a project's data may be found in.
///
/// The string representation is the human-readable label,
/// as offered to users for filtering.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, Display, EnumIter, EnumString, IntoStaticStr,
)]
pub enum Location {
    #[strum(to_string = "HCA Data Portal")]
    Hca,
    #[strum(to_string = "GEO")]
    Geo,
    #[strum(to_string = "ArrayExpress")]
    ArrayExpress,
    #[strum(to_string = "ENA")]
    Ena,
    #[strum(to_string = "EGA")]
    Ega,
    #[strum(to_string = "dbGaP")]
    Dbgap,
    #[strum(to_string = "cellxgene")]
    Cellxgene,
    #[strum(to_string = "Single Cell Expression Atlas")]
    Scea,
    #[strum(to_string = "UCSC Cell Browser")]
    Ucsc,
}

impl Location {
    #[must_use]
    pub fn label(self) -> &'static str {
        self.into()
    }

    #[must_use]
    pub fn label_table() -> HashMap<String, Self> {
        Self::iter()
            .map(|location| (location.label().to_owned(), location))
            .collect()
    }
}

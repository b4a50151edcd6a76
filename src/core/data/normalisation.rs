use std::fmt;

/// How a feature map is rescaled before it is colour mapped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Normalisation {
    /// Values are colour mapped as-is; anything outside [-1, 1] saturates.
    #[default]
    None,
    /// Divide by the largest finite magnitude so the extreme cell reaches 1.
    MaxAbs,
}

impl Normalisation {
    pub const ALL: &'static [Self] = &[Self::None, Self::MaxAbs];

    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::None => "None",
            Self::MaxAbs => "Max absolute value",
        }
    }
}

impl fmt::Display for Normalisation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str((*self).display_name())
    }
}

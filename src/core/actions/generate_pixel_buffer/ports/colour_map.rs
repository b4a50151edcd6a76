use crate::core::data::colour::Colour;
use std::error::Error;

/// Maps a single input value onto a displayable colour.
pub trait ColourMap {
    type T;
    type Failure: Error;

    fn map(&self, value: Self::T) -> Result<Colour, Self::Failure>;

    fn display_name(&self) -> &str;
}

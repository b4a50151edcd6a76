pub mod diverging;

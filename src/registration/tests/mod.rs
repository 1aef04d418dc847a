mod common;
mod fees;
mod validation;

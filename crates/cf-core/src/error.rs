use thiserror::Error;

pub type CfResult<T> = Result<T, CfError>;

#[derive(Error, Debug)]
pub enum CfError {
    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },

    #[error("Grid too small: {what} (got {imax}x{jmax}, need at least {min}x{min})")]
    GridTooSmall {
        what: &'static str,
        imax: usize,
        jmax: usize,
        min: usize,
    },

    #[error("Invariant violated: {what}")]
    Invariant { what: &'static str },
}

// Redirect targets for the child's stdout/stderr

use std::os::fd::{AsFd, BorrowedFd};

/// Where a child stream goes
///
/// `Inherit` is the "no redirection" sentinel: the child shares the
/// parent's stream. `Fd` borrows an already-open writable descriptor;
/// the runner never closes it.
#[derive(Debug, Clone, Copy, Default)]
pub enum Redirect<'fd> {
    #[default]
    Inherit,
    Fd(BorrowedFd<'fd>),
}

impl<'fd> Redirect<'fd> {
    /// Redirect into anything that owns a descriptor (File, pipe end, OwnedFd)
    pub fn to<F: AsFd + ?Sized>(target: &'fd F) -> Self {
        Redirect::Fd(target.as_fd())
    }

    pub fn is_inherit(&self) -> bool {
        matches!(self, Redirect::Inherit)
    }
}

impl<'fd> From<Option<BorrowedFd<'fd>>> for Redirect<'fd> {
    fn from(fd: Option<BorrowedFd<'fd>>) -> Self {
        fd.map_or(Redirect::Inherit, Redirect::Fd)
    }
}

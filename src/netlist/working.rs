//! Per thread default [Netlist], for code that builds one design at a time without passing a
//! netlist around.
//!
//! # Example
//! ```
//! # use rtlsim::working::*;
//! reset_working_netlist();
//! let width = with_working_netlist(|n| {
//!     let a = n.input(4, "a")?;
//!     let b = n.input(4, "b")?;
//!     n.add(a, b).map(|sum| sum.width())
//! })
//! .unwrap();
//! assert_eq!(width, 5);
//! assert_eq!(with_working_netlist(|n| n.wire_count()), 3);
//! ```
use super::Netlist;
use std::cell::RefCell;

thread_local! {
    static WORKING: RefCell<Netlist> = RefCell::new(Netlist::new());
}

/// Runs `f` with the working netlist of the current thread.
///
/// # Panics
///
/// Panics if called again from inside `f`.
pub fn with_working_netlist<T, F: FnOnce(&mut Netlist) -> T>(f: F) -> T {
    WORKING.with(|n| f(&mut n.borrow_mut()))
}

/// Replaces the working netlist with an empty one and returns the old one.
pub fn reset_working_netlist() -> Netlist {
    set_working_netlist(Netlist::new())
}

/// Makes `netlist` the working netlist and returns the one it replaces.
pub fn set_working_netlist(netlist: Netlist) -> Netlist {
    WORKING.with(|n| n.replace(netlist))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reset_and_restore() {
        reset_working_netlist();
        with_working_netlist(|n| n.input(1, "a").unwrap());
        let saved = reset_working_netlist();
        assert_eq!(saved.wire_count(), 1);
        assert_eq!(with_working_netlist(|n| n.wire_count()), 0);

        // The same name is free again in the new design.
        with_working_netlist(|n| n.input(1, "a").unwrap());
        let replaced = set_working_netlist(saved);
        assert_eq!(replaced.wire_count(), 1);
        assert!(with_working_netlist(|n| n.wire_by_name("a")).is_some());
    }

    #[test]
    fn test_threads_are_independent() {
        reset_working_netlist();
        with_working_netlist(|n| n.input(1, "a").unwrap());
        let other = std::thread::spawn(|| with_working_netlist(|n| n.wire_count()))
            .join()
            .unwrap();
        assert_eq!(other, 0);
    }
}

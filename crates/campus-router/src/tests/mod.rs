//! Behavioural test suites for the router.

mod backtrack;

pub use backtrack::Backtrack;

pub mod cluster;
pub mod error;
pub mod flow;
pub mod input;
pub mod model;
pub mod report;
pub mod route;
pub mod topo;

#[cfg(test)]
mod test;

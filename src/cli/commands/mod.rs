pub mod clients;
pub mod portfolios;
pub mod team;

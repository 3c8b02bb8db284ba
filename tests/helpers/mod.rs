pub mod cst_fixtures;

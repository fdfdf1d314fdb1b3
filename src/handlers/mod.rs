// Route handlers, one module per gateway.
//
// Account and stats handlers read and write the `profiles` table, the table
// handlers expose generic row operations, chat and learn front the model
// provider, and investease is the sandbox pass-through.

pub mod account;
pub mod chat;
pub mod health;
pub mod investease;
pub mod learn;
pub mod stats;
pub mod table;

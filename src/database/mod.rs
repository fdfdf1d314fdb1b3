pub mod profiles;
pub mod store;
pub mod supabase;

pub use store::{AuthOutcome, AuthProvider, DatabaseError, RowStore};
pub use supabase::SupabaseClient;

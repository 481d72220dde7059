pub mod supabase_admin;

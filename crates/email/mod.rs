pub mod sendgrid_client;

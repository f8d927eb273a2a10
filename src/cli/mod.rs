use clap::Subcommand;

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the HTTP chat relay
    Serve {
        #[arg(long, env = "PORT", default_value = "8000")]
        port: u16,

        /// Bind to 0.0.0.0 instead of 127.0.0.1, exposing the server on all network interfaces
        #[arg(long)]
        public: bool,

        /// Allowed browser origins (comma-separated)
        #[arg(
            long,
            env = "FRONTEND_ORIGIN",
            default_value = "http://localhost:3000",
            value_delimiter = ','
        )]
        frontend_origin: Vec<String>,

        /// Minutes between upload cleanup sweeps; 0 disables them
        #[arg(long, default_value = "60")]
        cleanup_interval_minutes: u64,

        #[arg(long, default_value = "24")]
        max_upload_age_hours: u64,
    },

    /// Print the models selectable for main_chat
    Models,

    /// Delete uploads older than the given age
    Cleanup {
        #[arg(long, default_value = "24")]
        max_age_hours: u64,
    },
}

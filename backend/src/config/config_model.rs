#[derive(Debug, Clone)]
pub struct DotEnvyConfig {
    pub backend_server: BackendServer,
    pub database: Database,
    pub staff_auth: StaffAuth,
    pub analytics: Analytics,
}

#[derive(Debug, Clone)]
pub struct BackendServer {
    pub port: u16,
    pub body_limit: u64,
    pub timeout: u64,
}

#[derive(Debug, Clone)]
pub struct Database {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone)]
pub struct StaffAuth {
    pub jwt_secret: String,
}

#[derive(Debug, Clone)]
pub struct Analytics {
    /// Widest month range a single cohort report may cover.
    pub cohort_max_months: usize,
}

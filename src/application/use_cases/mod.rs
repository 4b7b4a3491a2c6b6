/// Use cases module containing application business logic orchestration
mod collect_vulnerabilities;

pub use collect_vulnerabilities::CollectVulnerabilitiesUseCase;

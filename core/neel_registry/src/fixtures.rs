//! Sample registry contents used by the dashboard and by tests.
//!
//! | Id       | Notes                                                       |
//! |----------|-------------------------------------------------------------|
//! | ACC-003  | Trader, KYC `Pending`                                       |
//! | ACC-004  | Proponent, KYC `InProcess`                                  |
//! | PRJ-001  | Active, 1250 issued / 125 buffer, cycle 3 pending (VER-004) |
//! | PRJ-002  | Active, 890 issued / 89 buffer, cycle 2 pending without report (VER-005) |
//! | PRJ-003  | Pending, validation VAL-001 has a report                    |
//! | PRJ-004  | Pending, validation VAL-002 has no report                   |
//! | ACVA-003 | Accreditation `Pending`, no assignments                     |
//!
//! Every reference resolves, so the sample set satisfies the integrity rules
//! the transition engine enforces.

use chrono::NaiveDate;

use crate::storage::MemoryStore;
use crate::types::*;
use crate::Registry;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap_or_default()
}

fn milestone(
    on: NaiveDate,
    event: &str,
    credits_issued: Option<u64>,
    acva_id: Option<&str>,
    status: MilestoneStatus,
) -> TimelineEntry {
    TimelineEntry {
        date: on,
        event: event.to_string(),
        credits_issued,
        acva_id: acva_id.map(str::to_string),
        status,
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

pub fn accounts() -> Vec<Account> {
    vec![
        Account {
            id: "ACC-001".into(),
            company_name: "Green Forest Initiative".into(),
            account_type: AccountType::ProjectProponent,
            kyc_status: KycStatus::Done,
            project_ids: strings(&["PRJ-001", "PRJ-003"]),
            kyc_document: "kyc_green_forest.pdf".into(),
            email: "contact@greenforest.com".into(),
            registration_date: date(2023, 5, 20),
        },
        Account {
            id: "ACC-002".into(),
            company_name: "Tropical Conservation Corp".into(),
            account_type: AccountType::ProjectProponent,
            kyc_status: KycStatus::Done,
            project_ids: strings(&["PRJ-002"]),
            kyc_document: "kyc_tropical_conservation.pdf".into(),
            email: "info@tropicalconservation.org".into(),
            registration_date: date(2023, 8, 15),
        },
        Account {
            id: "ACC-003".into(),
            company_name: "Carbon Trade Solutions".into(),
            account_type: AccountType::Trader,
            kyc_status: KycStatus::Pending,
            project_ids: Vec::new(),
            kyc_document: "kyc_carbon_trade.pdf".into(),
            email: "admin@carbontradesolutions.com".into(),
            registration_date: date(2024, 1, 10),
        },
        Account {
            id: "ACC-004".into(),
            company_name: "Andes Reforestation Trust".into(),
            account_type: AccountType::ProjectProponent,
            kyc_status: KycStatus::InProcess,
            project_ids: strings(&["PRJ-004"]),
            kyc_document: "kyc_andes_reforestation.pdf".into(),
            email: "registry@andesreforestation.org".into(),
            registration_date: date(2024, 1, 25),
        },
    ]
}

pub fn projects() -> Vec<Project> {
    use MilestoneStatus::{Completed, Pending};

    vec![
        Project {
            id: "PRJ-001".into(),
            account_id: "ACC-001".into(),
            status: ProjectStatus::Active,
            credits_issued: 1_250,
            buffer_credits: 125,
            risk_assessment: RiskAssessment::Low,
            start_date: date(2023, 6, 15),
            country: "Brazil".into(),
            timeline: vec![
                milestone(date(2023, 6, 15), "Project Started", None, None, Completed),
                milestone(
                    date(2023, 8, 20),
                    "Validation Completed",
                    Some(0),
                    Some("ACVA-001"),
                    Completed,
                ),
                milestone(
                    date(2023, 12, 15),
                    "First Verification",
                    Some(625),
                    Some("ACVA-001"),
                    Completed,
                ),
                milestone(
                    date(2024, 6, 15),
                    "Second Verification",
                    Some(625),
                    Some("ACVA-001"),
                    Completed,
                ),
            ],
            metadata: ProjectMetadata {
                area: 500,
                methodology: "VM0007".into(),
                documentation: strings(&[
                    "PDD.pdf",
                    "Monitoring_Report_1.pdf",
                    "Monitoring_Report_2.pdf",
                ]),
                ownership: "Green Forest Initiative".into(),
                coordinates: Coordinates { lat: -15.7942, lng: -47.8822 },
            },
        },
        Project {
            id: "PRJ-002".into(),
            account_id: "ACC-002".into(),
            status: ProjectStatus::Active,
            credits_issued: 890,
            buffer_credits: 89,
            risk_assessment: RiskAssessment::Medium,
            start_date: date(2023, 9, 10),
            country: "Indonesia".into(),
            timeline: vec![
                milestone(date(2023, 9, 10), "Project Started", None, None, Completed),
                milestone(
                    date(2023, 11, 25),
                    "Validation Completed",
                    Some(0),
                    Some("ACVA-002"),
                    Completed,
                ),
                milestone(
                    date(2024, 3, 10),
                    "First Verification",
                    Some(890),
                    Some("ACVA-002"),
                    Completed,
                ),
            ],
            metadata: ProjectMetadata {
                area: 750,
                methodology: "VM0015".into(),
                documentation: strings(&["PDD.pdf", "Monitoring_Report_1.pdf"]),
                ownership: "Tropical Conservation Corp".into(),
                coordinates: Coordinates { lat: -2.5489, lng: 118.0149 },
            },
        },
        Project {
            id: "PRJ-003".into(),
            account_id: "ACC-001".into(),
            status: ProjectStatus::Pending,
            credits_issued: 0,
            buffer_credits: 0,
            risk_assessment: RiskAssessment::Low,
            start_date: date(2024, 1, 15),
            country: "Brazil".into(),
            timeline: vec![
                milestone(date(2024, 1, 15), "Project Started", None, None, Completed),
                milestone(
                    date(2024, 1, 20),
                    "Validation Submitted",
                    None,
                    Some("ACVA-001"),
                    Pending,
                ),
            ],
            metadata: ProjectMetadata {
                area: 320,
                methodology: "VM0047".into(),
                documentation: strings(&["PDD.pdf"]),
                ownership: "Green Forest Initiative".into(),
                coordinates: Coordinates { lat: -3.4653, lng: -62.2159 },
            },
        },
        Project {
            id: "PRJ-004".into(),
            account_id: "ACC-004".into(),
            status: ProjectStatus::Pending,
            credits_issued: 0,
            buffer_credits: 0,
            risk_assessment: RiskAssessment::High,
            start_date: date(2024, 2, 1),
            country: "Peru".into(),
            timeline: vec![
                milestone(date(2024, 2, 1), "Project Started", None, None, Completed),
                milestone(
                    date(2024, 2, 5),
                    "Validation Submitted",
                    None,
                    Some("ACVA-002"),
                    Pending,
                ),
            ],
            metadata: ProjectMetadata {
                area: 410,
                methodology: "AR-ACM0003".into(),
                documentation: strings(&["PDD.pdf"]),
                ownership: "Andes Reforestation Trust".into(),
                coordinates: Coordinates { lat: -12.0464, lng: -77.0428 },
            },
        },
    ]
}

pub fn acvas() -> Vec<Acva> {
    vec![
        Acva {
            id: "ACVA-001".into(),
            agency_name: "Global Carbon Verification".into(),
            country: "United States".into(),
            status: AcvaStatus::Active,
            projects_assigned: strings(&["PRJ-001", "PRJ-003"]),
            accreditation_docs: strings(&["accreditation_gcv.pdf", "iso_certificate.pdf"]),
            contact_info: ContactInfo {
                email: "verification@globalcarbon.com".into(),
                phone: "+1-555-0123".into(),
            },
        },
        Acva {
            id: "ACVA-002".into(),
            agency_name: "EcoVerify International".into(),
            country: "Germany".into(),
            status: AcvaStatus::Active,
            projects_assigned: strings(&["PRJ-002", "PRJ-004"]),
            accreditation_docs: strings(&["accreditation_evi.pdf"]),
            contact_info: ContactInfo {
                email: "contact@ecoverify.de".into(),
                phone: "+49-30-12345678".into(),
            },
        },
        Acva {
            id: "ACVA-003".into(),
            agency_name: "Nordic Carbon Assurance".into(),
            country: "Norway".into(),
            status: AcvaStatus::Pending,
            projects_assigned: Vec::new(),
            accreditation_docs: strings(&["accreditation_nca.pdf"]),
            contact_info: ContactInfo {
                email: "office@nordiccarbon.no".into(),
                phone: "+47-22-123456".into(),
            },
        },
    ]
}

pub fn validations() -> Vec<Validation> {
    vec![
        Validation {
            id: "VAL-001".into(),
            project_id: "PRJ-003".into(),
            account_id: "ACC-001".into(),
            acva_id: "ACVA-001".into(),
            status: ValidationStatus::Pending,
            pdd_document: "pdd_prj003.pdf".into(),
            validation_report: Some("validation_report_prj003.pdf".into()),
            start_date: date(2024, 1, 15),
            submission_date: date(2024, 1, 20),
        },
        Validation {
            id: "VAL-002".into(),
            project_id: "PRJ-004".into(),
            account_id: "ACC-004".into(),
            acva_id: "ACVA-002".into(),
            status: ValidationStatus::Pending,
            pdd_document: "pdd_prj004.pdf".into(),
            validation_report: None,
            start_date: date(2024, 2, 1),
            submission_date: date(2024, 2, 5),
        },
    ]
}

pub fn verifications() -> Vec<Verification> {
    let approved = |id: &str,
                    project: &str,
                    account: &str,
                    acva: &str,
                    cycles: u32,
                    credits: u64,
                    on: NaiveDate| Verification {
        id: id.into(),
        project_id: project.into(),
        account_id: account.into(),
        acva_id: acva.into(),
        cycles_done: cycles,
        status: VerificationStatus::Approved,
        credits_recommended: credits,
        buffer_credits_deducted: 0,
        verification_report: Some(format!(
            "verification_report_{}_cycle{cycles}.pdf",
            project.to_lowercase()
        )),
        verification_date: on,
    };

    vec![
        approved("VER-001", "PRJ-001", "ACC-001", "ACVA-001", 1, 625, date(2023, 12, 15)),
        approved("VER-002", "PRJ-001", "ACC-001", "ACVA-001", 2, 625, date(2024, 6, 15)),
        approved("VER-003", "PRJ-002", "ACC-002", "ACVA-002", 1, 890, date(2024, 3, 10)),
        Verification {
            id: "VER-004".into(),
            project_id: "PRJ-001".into(),
            account_id: "ACC-001".into(),
            acva_id: "ACVA-001".into(),
            cycles_done: 2,
            status: VerificationStatus::Pending,
            credits_recommended: 650,
            buffer_credits_deducted: 65,
            verification_report: Some("verification_report_prj001_cycle3.pdf".into()),
            verification_date: date(2024, 12, 15),
        },
        Verification {
            id: "VER-005".into(),
            project_id: "PRJ-002".into(),
            account_id: "ACC-002".into(),
            acva_id: "ACVA-002".into(),
            cycles_done: 1,
            status: VerificationStatus::Pending,
            credits_recommended: 720,
            buffer_credits_deducted: 72,
            verification_report: None,
            verification_date: date(2024, 9, 10),
        },
    ]
}

/// A store loaded with every sample record.
pub fn sample_store() -> MemoryStore {
    let mut store = MemoryStore::new();
    store.extend(accounts());
    store.extend(projects());
    store.extend(acvas());
    store.extend(validations());
    store.extend(verifications());
    store
}

pub fn sample_registry() -> Registry<MemoryStore> {
    Registry::new(sample_store())
}

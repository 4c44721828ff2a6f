//! Built-in sample data: vocabularies, explorer catalog, demo accounts,
//! and the initial contributions.

use std::path::Path;

use chrono::{DateTime, Utc};
use tracing::debug;

use kmportal_shared::{
    AssetStatus, Catalog, ContributionId, Contributor, Department, FileRef, KnowledgeAsset,
    KnowledgeContribution, KnowledgeTopic, LocalizedName, PortalError, Result, ReviewState, Role,
    TagOption, Topic, User, Vocabulary,
};

use crate::auth::{Account, AccountDirectory};
use crate::clock::Clock;
use crate::store::ContributionStore;

// ---------------------------------------------------------------------------
// Vocabularies
// ---------------------------------------------------------------------------

fn tag(id: &str, id_name: &str, en_name: &str) -> TagOption {
    TagOption {
        id: id.into(),
        name: LocalizedName::new(en_name, id_name),
    }
}

/// Tag level 1: document types.
pub fn document_types() -> Vec<TagOption> {
    vec![
        tag("metode", "Metode", "Method"),
        tag("curriculum", "Curriculum & Training Center", "Curriculum & Training Center"),
        tag("innovation", "Innovation", "Innovation"),
        tag("laporan-akhir", "Laporan Akhir", "Final Report"),
        tag("manual-book", "Manual Book", "Manual Book"),
        tag("spesifikasi", "Spesifikasi", "Specification"),
        tag("lesson-learned", "Lesson Learned/Kumpulan Kasus", "Lesson Learned/Case Collection"),
        tag("knowledge-sharing", "Materi Knowledge Sharing", "Knowledge Sharing Material"),
        tag("hasil-cop", "Hasil CoP", "CoP Results"),
        tag("knowledge-capture", "Knowledge Capture", "Knowledge Capture"),
        tag("prosedur", "Prosedur", "Procedure"),
        tag("instruksi-kerja", "Instruksi Kerja", "Work Instruction"),
        tag("standar", "Standar", "Standard"),
        tag("peraturan", "Peraturan Perundangan", "Regulations"),
        tag("referensi", "Referensi", "Reference"),
    ]
}

/// Tag level 2: priority topics.
pub fn priority_topics() -> Vec<TagOption> {
    [
        ("deep-basement", "Deep Basement (> 5 Basement)"),
        ("mep", "MEP Related"),
        ("data-center", "Data Center Related"),
        ("super-tall", "Super Tall Building"),
        ("mix-used", "Super Complex Mix Used Building"),
        ("design-build", "Design & Build"),
        ("trustworthy", "Trustworthy Reliable People"),
    ]
    .into_iter()
    .map(|(id, name)| TagOption {
        id: id.into(),
        name: LocalizedName::both(name),
    })
    .collect()
}

fn knowledge_topic(id: &str, name: &str, specific: &[&str]) -> KnowledgeTopic {
    KnowledgeTopic {
        id: id.into(),
        name: LocalizedName::both(name),
        specific_topics: specific.iter().map(|s| s.to_string()).collect(),
    }
}

/// Knowledge topics and the specific topics each one offers.
pub fn knowledge_topics() -> Vec<KnowledgeTopic> {
    vec![
        knowledge_topic(
            "design-engineering",
            "Design & Engineering",
            &[
                "Site Plan Management",
                "BIM",
                "Struktur",
                "Arsitektur",
                "Geoteknik",
                "Infrastruktur",
                "External Works",
                "Safety",
                "Equipment",
            ],
        ),
        knowledge_topic(
            "qhse",
            "Quality & Health Safety Environment",
            &["Quality", "Health Safety Environment"],
        ),
        knowledge_topic(
            "logistik",
            "Logistik",
            &["Tender", "Purchase Order", "Product Information", "Kontrak", "Logistik Knowledge"],
        ),
        knowledge_topic("equipment", "Equipment", &["Internal", "External"]),
        knowledge_topic(
            "information-technology",
            "Information Technology",
            &["Software Development", "Infrastructure & Networking", "IT Governance"],
        ),
        knowledge_topic(
            "human-capital",
            "Human Capital & Development",
            &[
                "Recruitment, Selection, & Placement",
                "Performance Management / Evaluasi Karyawan",
                "Learning & Development",
                "Career & Development",
                "Personnel Management",
                "Compensation & Benefit",
                "Industrial Relation",
                "Culture & System Development",
            ],
        ),
        knowledge_topic(
            "corporate-secretary",
            "Corporate Secretary",
            &[
                "External Communication",
                "Internal Communication",
                "Prosedur Corporate Secretary",
                "Kompetensi",
            ],
        ),
        knowledge_topic(
            "corporate-governance",
            "Corporate Governance & Compliance",
            &["ISO", "Risk Library", "Corporate Plan", "RSI Library"],
        ),
        knowledge_topic("estimation", "Estimation", &["Quantity", "Pricing", "Referensi"]),
        knowledge_topic(
            "customer-care",
            "Customer Care",
            &[
                "Penanganan Keluhan Pelanggan",
                "Pengukuran Kepuasan Pelanggan Eksternal",
                "Serah Terima Proyek",
                "CC Sharing",
            ],
        ),
        knowledge_topic(
            "legal-general-affair",
            "Legal & General Affair",
            &["General Affair", "Legal"],
        ),
        knowledge_topic(
            "accounting-cash",
            "Accounting & Cash Operation",
            &[
                "Perpajakan",
                "Akuntansi",
                "Penerimaan Dana",
                "Pengeluaran Dana",
                "Pengelolaan Dana & Fasilitas",
                "Bank Garansi",
                "Pinjaman Dinas",
            ],
        ),
        knowledge_topic(
            "project-control",
            "Project Control",
            &[
                "Kontrol Biaya Proyek",
                "Kontrol Tagihan Owner",
                "Lesson Learned Laporan Evaluasi Proyek (Internal)",
            ],
        ),
        knowledge_topic(
            "property-building",
            "Property & Building Management",
            &[
                "Marketing",
                "Repair & Maintenance",
                "Security",
                "Tenant Relation & Fit Out",
                "Laporan Pihak Ketiga",
                "Housekeeping",
            ],
        ),
    ]
}

pub fn vocabulary() -> Vocabulary {
    Vocabulary {
        document_types: document_types(),
        priority_topics: priority_topics(),
        knowledge_topics: knowledge_topics(),
    }
}

// ---------------------------------------------------------------------------
// Explorer catalog
// ---------------------------------------------------------------------------

fn topic(id: &str, en: &str, id_name: &str, item_count: u32, children: Vec<Topic>) -> Topic {
    Topic {
        id: id.into(),
        name: LocalizedName::new(en, id_name),
        item_count,
        children,
    }
}

fn department(
    id: &str,
    name: LocalizedName,
    icon: &str,
    owner: &str,
    topics: Vec<Topic>,
) -> Department {
    let item_count = topics.iter().map(|t| t.item_count).sum();
    Department {
        id: id.into(),
        name,
        icon: icon.into(),
        owner: owner.into(),
        item_count,
        topics,
    }
}

fn departments() -> Vec<Department> {
    vec![
        department(
            "design-engineering",
            LocalizedName::new("Design & Engineering", "Desain & Rekayasa"),
            "📐",
            "Engineering Division",
            vec![
                topic(
                    "de-metode",
                    "Methods",
                    "Metode",
                    2,
                    vec![
                        topic("dbm-metode", "Deep Basement", "Basement Dalam", 1, vec![]),
                        topic("dsw-metode", "Structural Works", "Pekerjaan Struktur", 1, vec![]),
                    ],
                ),
                topic("de-spesifikasi", "Specifications", "Spesifikasi", 1, vec![]),
                topic("de-lesson-learned", "Lessons Learned", "Lesson Learned", 1, vec![]),
            ],
        ),
        department(
            "qhse",
            LocalizedName::new("Quality & HSE", "Mutu & K3L"),
            "🦺",
            "QHSE Division",
            vec![
                topic("qh-prosedur", "Procedures", "Prosedur", 1, vec![]),
                topic("qh-instruksi-kerja", "Work Instructions", "Instruksi Kerja", 1, vec![]),
                topic("qh-standar", "Standards", "Standar", 1, vec![]),
            ],
        ),
        department(
            "equipment",
            LocalizedName::new("Equipment", "Peralatan"),
            "🏗️",
            "Equipment Division",
            vec![topic("eq-manual-book", "Manual Books", "Manual Book", 2, vec![])],
        ),
        department(
            "information-technology",
            LocalizedName::new("Information Technology", "Teknologi Informasi"),
            "💻",
            "IT Division",
            vec![
                topic("it-prosedur", "Procedures", "Prosedur", 1, vec![]),
                topic("it-knowledge-sharing", "Knowledge Sharing", "Knowledge Sharing", 1, vec![]),
            ],
        ),
        department(
            "human-capital",
            LocalizedName::new("Human Capital & Development", "Human Capital & Pengembangan"),
            "👥",
            "HC Division",
            vec![topic("hc-curriculum", "Curriculum", "Kurikulum", 1, vec![])],
        ),
        department(
            "corporate-governance",
            LocalizedName::new("Corporate Governance & Compliance", "Tata Kelola & Kepatuhan"),
            "⚖️",
            "Governance Division",
            vec![
                topic("cg-standar", "Standards", "Standar", 1, vec![]),
                topic("cg-peraturan", "Regulations", "Peraturan Perundangan", 1, vec![]),
            ],
        ),
    ]
}

#[allow(clippy::too_many_arguments)]
fn asset(
    id: &str,
    title: &str,
    title_id: Option<&str>,
    status: AssetStatus,
    department: &str,
    document_type: &str,
    author: &str,
    date: &str,
    tags: &[&str],
) -> KnowledgeAsset {
    KnowledgeAsset {
        id: id.into(),
        title: title.into(),
        title_id: title_id.map(String::from),
        status,
        department: department.into(),
        document_type: document_type.into(),
        author: author.into(),
        date: date.into(),
        tags: tags.iter().map(|t| t.to_string()).collect(),
    }
}

fn assets() -> Vec<KnowledgeAsset> {
    use AssetStatus::{Official, Reference, Validated};
    vec![
        asset(
            "ka-1",
            "Deep Basement Excavation Method",
            Some("Metode Galian Basement Dalam"),
            Official,
            "design-engineering",
            "metode",
            "Dr. James Chen",
            "2024-01-12",
            &["basement", "excavation", "shoring"],
        ),
        asset(
            "ka-2",
            "Precast Column Erection Method",
            Some("Metode Ereksi Kolom Precast"),
            Validated,
            "design-engineering",
            "metode",
            "Dr. James Chen",
            "2023-11-02",
            &["precast", "structure"],
        ),
        asset(
            "ka-3",
            "Concrete Works Technical Specification",
            Some("Spesifikasi Teknis Pekerjaan Beton"),
            Official,
            "design-engineering",
            "spesifikasi",
            "Michelle Lee",
            "2023-09-18",
            &["concrete", "specification"],
        ),
        asset(
            "ka-4",
            "Retaining Wall Failure Case Study",
            None,
            Reference,
            "design-engineering",
            "lesson-learned",
            "Chris Johnson",
            "2023-06-07",
            &["geotechnical", "case study"],
        ),
        asset(
            "ka-5",
            "Safety Procedures Handbook",
            Some("Buku Panduan Prosedur Keselamatan"),
            Official,
            "qhse",
            "prosedur",
            "Dr. Linda Martinez",
            "2024-01-05",
            &["hse", "handbook", "k3"],
        ),
        asset(
            "ka-6",
            "Working at Height Instruction",
            Some("Instruksi Kerja di Ketinggian"),
            Validated,
            "qhse",
            "instruksi-kerja",
            "Dr. Linda Martinez",
            "2023-12-14",
            &["hse", "height", "scaffolding"],
        ),
        asset(
            "ka-7",
            "ISO 9001 Quality Standard",
            Some("Standar Mutu ISO 9001"),
            Official,
            "qhse",
            "standar",
            "Dr. David Wilson",
            "2023-10-21",
            &["iso", "compliance", "quality"],
        ),
        asset(
            "ka-8",
            "Tower Crane Operation Manual",
            Some("Manual Operasi Tower Crane"),
            Reference,
            "equipment",
            "manual-book",
            "Alex Thompson",
            "2022-08-30",
            &["crane", "lifting"],
        ),
        asset(
            "ka-9",
            "Concrete Pump Maintenance Manual",
            None,
            Reference,
            "equipment",
            "manual-book",
            "Alex Thompson",
            "2023-03-16",
            &["pump", "maintenance"],
        ),
        asset(
            "ka-10",
            "Access Request Procedure",
            Some("Prosedur Permintaan Akses"),
            Official,
            "information-technology",
            "prosedur",
            "Chris Johnson",
            "2024-01-20",
            &["access", "security"],
        ),
        asset(
            "ka-11",
            "BIM Coordination Sharing Session",
            None,
            Validated,
            "information-technology",
            "knowledge-sharing",
            "Robert Anderson",
            "2023-12-01",
            &["bim", "coordination"],
        ),
        asset(
            "ka-12",
            "Site Engineer Onboarding Curriculum",
            Some("Kurikulum Orientasi Site Engineer"),
            Validated,
            "human-capital",
            "curriculum",
            "Emily Davis",
            "2023-07-25",
            &["onboarding", "training"],
        ),
        asset(
            "ka-13",
            "Anti-Bribery Management Standard",
            Some("Standar Sistem Manajemen Anti Penyuapan"),
            Official,
            "corporate-governance",
            "standar",
            "Dr. David Wilson",
            "2023-05-09",
            &["iso 37001", "compliance"],
        ),
        asset(
            "ka-14",
            "Construction Services Regulation Digest",
            Some("Ringkasan Peraturan Jasa Konstruksi"),
            Reference,
            "corporate-governance",
            "peraturan",
            "Sarah Mitchell",
            "2022-11-11",
            &["regulation", "legal"],
        ),
    ]
}

/// The built-in explorer catalog.
pub fn catalog() -> Catalog {
    Catalog {
        departments: departments(),
        document_types: document_types(),
        assets: assets(),
    }
}

/// Load a catalog from a JSON file, or the built-in one when `path` is `None`.
pub fn load_catalog(path: Option<&Path>) -> Result<Catalog> {
    let Some(path) = path else {
        return Ok(catalog());
    };
    let content = std::fs::read_to_string(path).map_err(|e| PortalError::io(path, e))?;
    let catalog: Catalog = serde_json::from_str(&content)?;
    debug!(
        path = %path.display(),
        departments = catalog.departments.len(),
        assets = catalog.assets.len(),
        "catalog loaded"
    );
    Ok(catalog)
}

// ---------------------------------------------------------------------------
// Accounts
// ---------------------------------------------------------------------------

fn account(id: &str, email: &str, password: &str, name: &str, role: Role, dept: &str) -> Account {
    Account::new(
        User {
            id: id.into(),
            name: name.into(),
            email: email.into(),
            role,
            department: Some(dept.into()),
        },
        password,
    )
}

/// Nine demo accounts, three per role.
pub fn accounts() -> AccountDirectory {
    AccountDirectory::new(vec![
        account(
            "1",
            "admin1@km.local",
            "Admin123!",
            "Sarah Mitchell",
            Role::Admin,
            "Knowledge Management",
        ),
        account(
            "2",
            "admin2@km.local",
            "Admin123!",
            "Robert Anderson",
            Role::Admin,
            "Knowledge Management",
        ),
        account(
            "3",
            "admin3@km.local",
            "Admin123!",
            "Michelle Lee",
            Role::Admin,
            "Knowledge Management",
        ),
        account("4", "sme1@km.local", "Sme123!", "Dr. James Chen", Role::Sme, "Engineering"),
        account("5", "sme2@km.local", "Sme123!", "Dr. Linda Martinez", Role::Sme, "Safety"),
        account("6", "sme3@km.local", "Sme123!", "Dr. David Wilson", Role::Sme, "Compliance"),
        account("7", "user1@km.local", "User123!", "Alex Thompson", Role::User, "Operations"),
        account("8", "user2@km.local", "User123!", "Emily Davis", Role::User, "HR"),
        account("9", "user3@km.local", "User123!", "Chris Johnson", Role::User, "IT"),
    ])
}

// ---------------------------------------------------------------------------
// Contributions
// ---------------------------------------------------------------------------

fn submitted(rfc3339: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(rfc3339)
        .map(|d| d.with_timezone(&Utc))
        .map_err(|e| PortalError::validation(format!("bad seed date: {e}")))
}

/// The two sample contributions the portal starts with.
pub fn contributions() -> Result<Vec<KnowledgeContribution>> {
    Ok(vec![
        KnowledgeContribution {
            id: ContributionId::from("contrib-1"),
            title: "Metode Konstruksi Deep Basement".into(),
            file: FileRef::new("metode-deep-basement.pdf", "/sample.pdf"),
            tag_level1: "metode".into(),
            tag_level2: vec!["deep-basement".into()],
            tag_level3: vec!["Excavation Method".into(), "Shoring System".into()],
            contributor: Contributor {
                id: "user1".into(),
                name: "Ahmad Fauzi".into(),
                email: "user1@km.local".into(),
            },
            submission_date: submitted("2024-01-15T10:30:00Z")?,
            version: 1,
            review: ReviewState::Pending,
        },
        KnowledgeContribution {
            id: ContributionId::from("contrib-2"),
            title: "Panduan Safety MEP Installation".into(),
            file: FileRef::new("safety-mep-guide.pdf", "/sample.pdf"),
            tag_level1: "instruksi-kerja".into(),
            tag_level2: vec!["mep".into()],
            tag_level3: vec!["Electrical Safety".into(), "HVAC Installation".into()],
            contributor: Contributor {
                id: "user2".into(),
                name: "Budi Santoso".into(),
                email: "user2@km.local".into(),
            },
            submission_date: submitted("2024-01-16T14:20:00Z")?,
            version: 1,
            review: ReviewState::Pending,
        },
    ])
}

/// A store holding the sample contributions.
pub fn store<C: Clock>(clock: C) -> Result<ContributionStore<C>> {
    ContributionStore::from_contributions(contributions()?, clock)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::{AttributeFilter, TaxonomyFilter};
    use crate::navigation::ExplorerNav;
    use kmportal_shared::{Locale, derived_key};

    #[test]
    fn topic_keys_resolve_to_document_types() {
        fn walk<'a>(topics: &'a [Topic], out: &mut Vec<&'a Topic>) {
            for t in topics {
                out.push(t);
                walk(&t.children, out);
            }
        }

        let cat = catalog();
        let mut topics = Vec::new();
        for dept in &cat.departments {
            walk(&dept.topics, &mut topics);
        }

        assert!(topics.iter().any(|t| !t.children.is_empty()));
        for t in topics {
            assert!(
                cat.document_types.iter().any(|d| d.id == derived_key(&t.id)),
                "{} has no matching document type",
                t.id
            );
        }
    }

    #[test]
    fn nested_topic_selection_finds_assets() {
        let cat = catalog();
        let mut nav = ExplorerNav::new();
        nav.select_topic(&cat, "dbm-metode", Locale::En).expect("select");
        assert_eq!(nav.breadcrumbs().len(), 3);

        let query = nav.query("", AttributeFilter::All, AttributeFilter::All);
        let outcome = TaxonomyFilter::default().filter(&cat.assets, &query);
        assert!(!outcome.is_empty());
        assert!(
            outcome
                .assets()
                .iter()
                .all(|a| a.department == "design-engineering" && a.document_type == "metode")
        );
    }

    #[test]
    fn assets_reference_known_departments_and_types() {
        let cat = catalog();
        for a in &cat.assets {
            assert!(cat.department(&a.department).is_some(), "{}", a.id);
            assert!(
                cat.document_types.iter().any(|d| d.id == a.document_type),
                "{}",
                a.id
            );
        }
    }

    #[test]
    fn department_counts_sum_topics() {
        let cat = catalog();
        let qhse = cat.department("qhse").expect("qhse");
        assert_eq!(qhse.item_count, 3);
    }

    #[test]
    fn catalog_file_round_trips() {
        let path = std::env::temp_dir()
            .join(format!("kmportal_catalog_{}.json", uuid::Uuid::now_v7()));
        let json = serde_json::to_string(&catalog()).expect("serialize");
        std::fs::write(&path, json).expect("write");

        let loaded = load_catalog(Some(&path)).expect("load");
        assert_eq!(loaded, catalog());
        assert_eq!(load_catalog(None).expect("builtin"), catalog());

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn missing_catalog_file_is_io_error() {
        let path = std::env::temp_dir()
            .join(format!("kmportal_missing_{}.json", uuid::Uuid::now_v7()));
        let err = load_catalog(Some(&path)).unwrap_err();
        assert!(matches!(err, PortalError::Io { .. }));
    }

    #[test]
    fn seed_store_holds_two_pending() {
        let store = store(crate::clock::SystemClock).expect("seed");
        let ids: Vec<_> = store.contributions().iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, ["contrib-1", "contrib-2"]);
        assert_eq!(store.status_counts().pending, 2);
    }
}

//! `SQLite` schema definitions for scierie.
//!
//! Every date column holds `YYYY-MM-DD HH:MM:SS` UTC text (see
//! [`crate::timestamp`]).

/// Registered accounts.
pub const CREATE_USERS_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS users (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    email TEXT NOT NULL UNIQUE,
    password_hash TEXT NOT NULL,
    role TEXT NOT NULL DEFAULT 'EMPLOYEE',
    created_at TEXT NOT NULL
)
";

/// Stock on hand, one row per kind of wood.
pub const CREATE_STOCKS_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS stocks (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    type TEXT NOT NULL UNIQUE,
    quantity REAL NOT NULL,
    unit_price REAL NOT NULL,
    total REAL NOT NULL,
    date TEXT NOT NULL,
    created_at TEXT NOT NULL
)
";

/// Production log.
pub const CREATE_PRODUCTIONS_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS productions (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    type_bois TEXT NOT NULL,
    quantity REAL NOT NULL,
    unit_price REAL NOT NULL,
    total REAL NOT NULL,
    date TEXT NOT NULL,
    created_at TEXT NOT NULL
)
";

/// Sales.
pub const CREATE_VENTES_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS ventes (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    type TEXT NOT NULL,
    quantity REAL NOT NULL,
    unit_price REAL NOT NULL,
    total REAL NOT NULL,
    unite TEXT,
    date TEXT NOT NULL,
    created_at TEXT NOT NULL
)
";

/// Operating expenses.
pub const CREATE_DEPENSES_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS depenses (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    date TEXT NOT NULL,
    categorie TEXT NOT NULL,
    montant REAL NOT NULL,
    created_at TEXT NOT NULL
)
";

/// Supplier charges.
pub const CREATE_CHARGES_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS charges (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    date TEXT NOT NULL,
    fournisseur TEXT NOT NULL,
    quantite REAL NOT NULL,
    poids REAL NOT NULL,
    prix REAL NOT NULL,
    created_at TEXT NOT NULL
)
";

/// Invoices. `products` holds the lines as a JSON array.
pub const CREATE_FACTURES_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS factures (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    numero_facture TEXT NOT NULL UNIQUE,
    client_nom TEXT NOT NULL,
    client_telephone TEXT NOT NULL,
    client_adresse TEXT,
    type_de_produit TEXT NOT NULL,
    quantity REAL NOT NULL,
    price REAL NOT NULL,
    products TEXT NOT NULL DEFAULT '[]',
    total REAL NOT NULL,
    mode_paiement TEXT NOT NULL,
    statut TEXT NOT NULL,
    date TEXT NOT NULL,
    created_at TEXT NOT NULL
)
";

/// Single-row profit summary.
pub const CREATE_BENEFICE_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS benefice (
    id INTEGER PRIMARY KEY CHECK (id = 1),
    total_production REAL NOT NULL,
    total_charges REAL NOT NULL,
    total_depenses REAL NOT NULL,
    benefice_net REAL NOT NULL,
    updated_at TEXT NOT NULL
)
";

/// Date indexes for the report queries.
pub const CREATE_DATE_INDEXES: &str = r"
CREATE INDEX IF NOT EXISTS idx_stocks_date ON stocks(date);
CREATE INDEX IF NOT EXISTS idx_productions_date ON productions(date);
CREATE INDEX IF NOT EXISTS idx_ventes_date ON ventes(date);
CREATE INDEX IF NOT EXISTS idx_depenses_date ON depenses(date);
CREATE INDEX IF NOT EXISTS idx_charges_date ON charges(date);
CREATE INDEX IF NOT EXISTS idx_factures_date ON factures(date);
";

/// SQL statement to create the metadata table for storing key-value pairs.
pub const CREATE_METADATA_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS metadata (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
)
";

/// All schema creation statements in order. Each entry may hold several
/// statements and is run as a batch.
pub const SCHEMA_STATEMENTS: &[&str] = &[
    CREATE_USERS_TABLE,
    CREATE_STOCKS_TABLE,
    CREATE_PRODUCTIONS_TABLE,
    CREATE_VENTES_TABLE,
    CREATE_DEPENSES_TABLE,
    CREATE_CHARGES_TABLE,
    CREATE_FACTURES_TABLE,
    CREATE_BENEFICE_TABLE,
    CREATE_DATE_INDEXES,
    CREATE_METADATA_TABLE,
];

/// Business tables, in schema order.
pub const BUSINESS_TABLES: &[&str] = &[
    "users",
    "stocks",
    "productions",
    "ventes",
    "depenses",
    "charges",
    "factures",
    "benefice",
];

use crate::session::WizardStep;

#[derive(Debug, thiserror::Error)]
pub enum CathlabError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("invalid text: {0}")]
    Text(#[from] cathlab_types::TextError),

    #[error("failed to read equipment catalog: {0}")]
    CatalogRead(std::io::Error),
    #[error("malformed equipment catalog: {0}")]
    Csv(#[from] csv::Error),
    #[error("failed to read equipment workbook: {0}")]
    Workbook(#[from] calamine::Error),
    #[error("equipment workbook has no sheet with a header row")]
    EmptyWorkbook,
    #[error("equipment catalog is missing the '{0}' column")]
    MissingColumn(String),
    #[error("equipment catalog row {row} has no equipment name")]
    BlankEquipmentName { row: usize },
    #[error("equipment '{0}' appears more than once in the catalog")]
    DuplicateEquipment(String),
    #[error("invalid amount '{value}' in column '{column}' for '{item}'")]
    InvalidAmount {
        item: String,
        column: String,
        value: String,
    },

    #[error("failed to read procedure book: {0}")]
    ProceduresRead(std::io::Error),
    #[error("failed to deserialize YAML: {0}")]
    YamlDeserialization(serde_yaml::Error),
    #[error("operation '{0}' is defined more than once")]
    DuplicateOperation(String),
    #[error("unknown operation '{0}'")]
    UnknownOperation(String),
    #[error("unknown equipment '{0}'")]
    UnknownEquipment(String),
    #[error("'{name}' is limited to 0 or 1, got {quantity}")]
    LimitedQuantity { name: String, quantity: u32 },
    #[error("unknown healthcare scheme '{0}'")]
    UnknownScheme(String),

    #[error("this input belongs to the {expected} step, the session is on {actual}")]
    WrongStep {
        expected: WizardStep,
        actual: WizardStep,
    },
    #[error("there is no step before {0}")]
    NoPreviousStep(WizardStep),
    #[error("there is no step after {0}")]
    NoNextStep(WizardStep),

    #[error("failed to read receipt font: {0}")]
    FontRead(std::io::Error),
    #[error("failed to render receipt: {0}")]
    Pdf(String),
}

pub type CathlabResult<T> = std::result::Result<T, CathlabError>;

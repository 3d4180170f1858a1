use crate::error::PipelineError;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MunicipalityEntry {
    pub name: String,
    pub variants: Vec<String>,
}

const MUNICIPALITIES: &[(&str, &[&str])] = &[
    ("Apartadó", &["apartado", "apartadó", "apartad"]),
    ("Turbo", &["turbo"]),
    ("Carepa", &["carepa"]),
    ("Chigorodó", &["chigorodó", "chigorodo", "chigorod"]),
    ("Necoclí", &["necoclí", "necocli", "necocl"]),
    ("Arboletes", &["arboletes"]),
    ("San Juan de Urabá", &["san juan de uraba", "san juan de urabá"]),
    ("San Pedro de Urabá", &["san pedro de uraba", "san pedro de urabá"]),
    ("Mutatá", &["mutatá", "mutata"]),
    ("Murindó", &["murindó", "murindo"]),
    ("Vigía del Fuerte", &["vigía del fuerte", "vigia del fuerte"]),
    ("Dabeiba", &["dabeiba"]),
];

const BENEFITS: &[(&str, &[&str])] = &[
    ("Salud/EPS", &["salud", "eps", "arl", "seguridad social"]),
    ("Pensión", &["pensión", "pension", "fondo de pensiones"]),
    ("Bonificación", &["bonificación", "bonificacion", "prima", "bono"]),
    ("Horario flexible", &["horario flexible", "flexible"]),
    ("Teletrabajo", &["home office", "remoto", "teletrabajo", "trabajo remoto"]),
    ("Transporte", &["transporte", "movilidad", "auxilio de transporte"]),
    ("Alimentación", &["alimentación", "alimentacion", "almuerzo", "casino"]),
    ("Capacitación", &["capacitación", "capacitacion", "formación", "curso"]),
    ("Comisiones", &["comisión", "comision", "comisiones", "variable"]),
];

/// Ordered municipality list plus the two fallback keyword sets.
///
/// Declaration order is the tie-break when a text mentions several places.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct ZoneTable {
    pub municipalities: Vec<MunicipalityEntry>,
    pub region_keywords: Vec<String>,
    pub broader_region_keywords: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct ContractKeywords {
    pub short_term: Vec<String>,
    pub permanent: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BenefitEntry {
    pub tag: String,
    pub keywords: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct BenefitTable {
    pub benefits: Vec<BenefitEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct RelevanceKeywords {
    pub strong: Vec<String>,
    pub medium: Vec<String>,
    pub negative: Vec<String>,
}

/// All keyword tables the classifiers are built from.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Lexicon {
    pub zones: ZoneTable,
    pub contracts: ContractKeywords,
    pub benefits: BenefitTable,
    pub relevance: RelevanceKeywords,
}

impl Default for Lexicon {
    fn default() -> Self {
        Self::uraba()
    }
}

impl Lexicon {
    /// Built-in Spanish lexicon for the Urabá region of Antioquia.
    pub fn uraba() -> Self {
        let municipalities = MUNICIPALITIES
            .iter()
            .map(|(name, variants)| MunicipalityEntry {
                name: (*name).to_string(),
                variants: words(variants),
            })
            .collect();

        let benefits = BENEFITS
            .iter()
            .map(|(tag, keywords)| BenefitEntry {
                tag: (*tag).to_string(),
                keywords: words(keywords),
            })
            .collect();

        Self {
            zones: ZoneTable {
                municipalities,
                region_keywords: words(&["urabá", "uraba"]),
                broader_region_keywords: words(&["antioquia"]),
            },
            contracts: ContractKeywords {
                short_term: words(&[
                    "temporal",
                    "obra o labor",
                    "prestación de servicios",
                    "freelance",
                    "contrato por obra",
                    "tiempo parcial",
                    "medio tiempo",
                    "part-time",
                    "proyecto",
                    "pasantía",
                    "practicante",
                    "aprendiz",
                    "suplencia",
                ]),
                permanent: words(&[
                    "indefinido",
                    "término indefinido",
                    "planta",
                    "permanente",
                    "fijo",
                    "tiempo completo",
                    "full-time",
                    "contrato a término indefinido",
                ]),
            },
            benefits: BenefitTable { benefits },
            relevance: RelevanceKeywords {
                strong: words(&[
                    "apartadó",
                    "apartado",
                    "turbo",
                    "urabá",
                    "uraba",
                    "carepa",
                    "chigorodó",
                    "chigorodo",
                    "necoclí",
                    "necocli",
                    "arboletes",
                    "mutatá",
                    "mutata",
                    "dabeiba",
                    "zona bananera",
                    "eje bananero",
                ]),
                medium: words(&["antioquia", "colombia"]),
                negative: words(&[
                    "bogotá",
                    "bogota",
                    "medellín",
                    "medellin",
                    "cali",
                    "barranquilla",
                    "cartagena",
                    "bucaramanga",
                ]),
            },
        }
    }

    /// Reads a lexicon from a JSON file, lower-casing and validating every table.
    pub fn from_path(path: &Path) -> Result<Self, PipelineError> {
        let raw = fs::read_to_string(path)?;
        let lexicon: Lexicon = serde_json::from_str(&raw)?;
        lexicon.normalized().validated()
    }

    /// Lower-cases and trims every keyword so matching against folded text works.
    pub fn normalized(mut self) -> Self {
        for entry in &mut self.zones.municipalities {
            entry.name = entry.name.trim().to_string();
            fold_all(&mut entry.variants);
        }
        fold_all(&mut self.zones.region_keywords);
        fold_all(&mut self.zones.broader_region_keywords);
        fold_all(&mut self.contracts.short_term);
        fold_all(&mut self.contracts.permanent);
        for entry in &mut self.benefits.benefits {
            entry.tag = entry.tag.trim().to_string();
            fold_all(&mut entry.keywords);
        }
        fold_all(&mut self.relevance.strong);
        fold_all(&mut self.relevance.medium);
        fold_all(&mut self.relevance.negative);
        self
    }

    pub fn validated(self) -> Result<Self, PipelineError> {
        self.validate()?;
        Ok(self)
    }

    /// Rejects empty or duplicate municipality names and benefit tags, and empty keywords.
    pub fn validate(&self) -> Result<(), PipelineError> {
        let mut names = HashSet::new();
        for entry in &self.zones.municipalities {
            if entry.name.is_empty() {
                return Err(PipelineError::InvalidLexicon(
                    "municipality name is empty".to_string(),
                ));
            }
            if !names.insert(entry.name.as_str()) {
                return Err(PipelineError::InvalidLexicon(format!(
                    "duplicate municipality `{}`",
                    entry.name
                )));
            }
            ensure_keywords(&format!("municipality `{}`", entry.name), &entry.variants)?;
        }

        let mut tags = HashSet::new();
        for entry in &self.benefits.benefits {
            if entry.tag.is_empty() {
                return Err(PipelineError::InvalidLexicon("benefit tag is empty".to_string()));
            }
            if !tags.insert(entry.tag.as_str()) {
                return Err(PipelineError::InvalidLexicon(format!(
                    "duplicate benefit tag `{}`",
                    entry.tag
                )));
            }
            ensure_keywords(&format!("benefit `{}`", entry.tag), &entry.keywords)?;
        }

        for (table, keywords) in [
            ("region keywords", &self.zones.region_keywords),
            ("broader region keywords", &self.zones.broader_region_keywords),
            ("short-term keywords", &self.contracts.short_term),
            ("permanent keywords", &self.contracts.permanent),
            ("strong relevance keywords", &self.relevance.strong),
            ("medium relevance keywords", &self.relevance.medium),
            ("negative relevance keywords", &self.relevance.negative),
        ] {
            if keywords.iter().any(|keyword| keyword.is_empty()) {
                return Err(PipelineError::InvalidLexicon(format!(
                    "{table} contain an empty keyword"
                )));
            }
        }

        Ok(())
    }
}

fn words(values: &[&str]) -> Vec<String> {
    values.iter().map(|value| (*value).to_string()).collect()
}

fn fold_all(values: &mut [String]) {
    for value in values.iter_mut() {
        *value = value.trim().to_lowercase();
    }
}

// An empty keyword is a substring of every text and would match everything.
fn ensure_keywords(owner: &str, keywords: &[String]) -> Result<(), PipelineError> {
    if keywords.is_empty() {
        return Err(PipelineError::InvalidLexicon(format!("{owner} has no keywords")));
    }
    if keywords.iter().any(|keyword| keyword.is_empty()) {
        return Err(PipelineError::InvalidLexicon(format!(
            "{owner} has an empty keyword"
        )));
    }
    Ok(())
}

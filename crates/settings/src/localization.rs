use icu_locid::{Locale, ParserError as LocaleParserError};
use icu_plurals::{PluralCategory as IcuPluralCategory, PluralRules};
use serde::Deserialize;
use std::borrow::Cow;
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;
use thiserror::Error;

pub const DEFAULT_LOCALE_CODE: &str = "pt-CV";
const DEFAULT_DISPLAY_NAME: &str = "Português (Cabo Verde)";
const ENGLISH_LOCALE_CODE: &str = "en-US";
const ENGLISH_DISPLAY_NAME: &str = "English (en-US)";

const PORTUGUESE_STRINGS: &[(&str, &str)] = &[
    ("overlay.access.title", "Acesso"),
    ("overlay.help.title", "Ajuda"),
    ("overlay.interactive-map.title", "Mapa Interativo"),
    ("overlay.map.title", "Mapa"),
    ("overlay.legislation.title", "Legislação"),
    ("overlay.incident.title", "Registo de Ocorrências"),
    ("overlay.waste.title", "Resíduos"),
    ("overlay.participation.title", "Participação"),
    ("overlay.bulky-waste.title", "Monos e Volumosos"),
    ("overlay.public-consultations.title", "Consultas Públicas"),
    ("overlay.legislation-info.title", "Sobre a Legislação"),
    ("overlay.how-to-participate.title", "Como Participar"),
    ("overlay.interactive-maps-info.title", "Sobre os Mapas Interativos"),
    ("overlay.incident-registration-info.title", "Sobre o Registo de Ocorrências"),
    ("overlay.about.title", "Sobre"),
    ("overlay.faq.title", "Perguntas Frequentes"),
    ("overlay.terms.title", "Termos de Utilização"),
    ("overlay.privacy.title", "Política de Privacidade"),
    ("overlay.support.title", "Suporte"),
    ("support.form.subject", "Assunto"),
    ("support.form.email", "Email de contacto"),
    ("support.form.message", "Mensagem"),
    ("support.form.attach", "Anexar ficheiros"),
    ("support.form.submit", "Enviar pedido"),
    ("support.form.sent", "Pedido {0} enviado com sucesso."),
    ("support.error.subject", "Indique o assunto."),
    ("support.error.email", "Indique um email válido."),
    ("support.error.message", "Escreva a sua mensagem."),
    ("support.error.too_large", "O ficheiro {0} excede 10 MB."),
    (
        "support.error.save_failed",
        "Não foi possível guardar o pedido. Tente novamente.",
    ),
];

const ENGLISH_STRINGS: &[(&str, &str)] = &[
    ("overlay.access.title", "Sign in"),
    ("overlay.help.title", "Help"),
    ("overlay.interactive-map.title", "Interactive Map"),
    ("overlay.map.title", "Map"),
    ("overlay.legislation.title", "Legislation"),
    ("overlay.incident.title", "Report an Incident"),
    ("overlay.waste.title", "Waste"),
    ("overlay.participation.title", "Participation"),
    ("overlay.bulky-waste.title", "Bulky Waste"),
    ("overlay.public-consultations.title", "Public Consultations"),
    ("overlay.legislation-info.title", "About Legislation"),
    ("overlay.how-to-participate.title", "How to Participate"),
    ("overlay.interactive-maps-info.title", "About Interactive Maps"),
    ("overlay.incident-registration-info.title", "About Incident Reports"),
    ("overlay.about.title", "About"),
    ("overlay.faq.title", "FAQ"),
    ("overlay.terms.title", "Terms of Use"),
    ("overlay.privacy.title", "Privacy Policy"),
    ("overlay.support.title", "Support"),
    ("support.form.subject", "Subject"),
    ("support.form.email", "Contact email"),
    ("support.form.message", "Message"),
    ("support.form.attach", "Attach files"),
    ("support.form.submit", "Send request"),
    ("support.form.sent", "Request {0} sent successfully."),
    ("support.error.subject", "Please enter a subject."),
    ("support.error.email", "Please enter a valid email."),
    ("support.error.message", "Please write your message."),
    ("support.error.too_large", "File {0} exceeds 10 MB."),
    (
        "support.error.save_failed",
        "The request could not be saved. Please try again.",
    ),
];

const ATTACHMENT_COUNT_KEY: &str = "support.attachments.count";
const PORTUGUESE_ATTACHMENT_COUNT: &[(PluralForm, &str)] = &[
    (PluralForm::One, "{count} ficheiro anexado"),
    (PluralForm::Other, "{count} ficheiros anexados"),
];
const ENGLISH_ATTACHMENT_COUNT: &[(PluralForm, &str)] = &[
    (PluralForm::One, "{count} file attached"),
    (PluralForm::Other, "{count} files attached"),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum PluralForm {
    Zero,
    One,
    Two,
    Few,
    Many,
    Other,
}

impl FromStr for PluralForm {
    type Err = ();

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "zero" => Ok(Self::Zero),
            "one" => Ok(Self::One),
            "two" => Ok(Self::Two),
            "few" => Ok(Self::Few),
            "many" => Ok(Self::Many),
            "other" => Ok(Self::Other),
            _ => Err(()),
        }
    }
}

impl From<IcuPluralCategory> for PluralForm {
    fn from(value: IcuPluralCategory) -> Self {
        match value {
            IcuPluralCategory::Zero => Self::Zero,
            IcuPluralCategory::One => Self::One,
            IcuPluralCategory::Two => Self::Two,
            IcuPluralCategory::Few => Self::Few,
            IcuPluralCategory::Many => Self::Many,
            IcuPluralCategory::Other => Self::Other,
        }
    }
}

#[derive(Debug, Clone)]
enum Message {
    Simple(String),
    Plural(BTreeMap<PluralForm, String>),
}

/// 模板參數：位置參數 `{0}` 與計數 `{count}`。 / Template arguments: positional `{0}` and `{count}`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalizationParams<'a> {
    count: Option<u64>,
    positional: &'a [&'a str],
}

impl<'a> LocalizationParams<'a> {
    pub fn new(positional: &'a [&'a str]) -> Self {
        Self {
            count: None,
            positional,
        }
    }

    pub fn with_count(positional: &'a [&'a str], count: u64) -> Self {
        Self {
            count: Some(count),
            positional,
        }
    }

    pub fn count(&self) -> Option<u64> {
        self.count
    }
}

impl LocalizationParams<'static> {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn count_only(count: u64) -> Self {
        Self {
            count: Some(count),
            positional: &[],
        }
    }
}

#[derive(Debug, Error)]
pub enum LocalizationError {
    #[error("cannot list catalog directory {0}: {1}")]
    ReadDir(PathBuf, io::Error),
    #[error("cannot read catalog {0}: {1}")]
    ReadFile(PathBuf, io::Error),
    #[error("catalog {0} is not valid JSON: {1}")]
    ParseFile(PathBuf, serde_json::Error),
    #[error("{locale}: plural entry '{key}' needs an 'other' form")]
    PluralMissingOther { locale: String, key: String },
    #[error("{locale}: plural entry '{key}' uses unknown category '{category}'")]
    InvalidPluralCategory {
        locale: String,
        key: String,
        category: String,
    },
    #[error("'{locale}' is not a valid locale code: {error}")]
    InvalidLocaleIdentifier {
        locale: String,
        error: LocaleParserError,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocaleSummary {
    pub code: String,
    pub display_name: String,
}

#[derive(Debug, Clone)]
struct Catalog {
    summary: LocaleSummary,
    plural_rules: Option<Arc<PluralRules>>,
    messages: HashMap<String, Message>,
}

impl Catalog {
    fn builtin(
        code: &str,
        display_name: &str,
        strings: &[(&str, &str)],
        attachment_count: &[(PluralForm, &str)],
    ) -> Self {
        let mut messages: HashMap<String, Message> = strings
            .iter()
            .map(|(key, value)| ((*key).to_string(), Message::Simple((*value).to_string())))
            .collect();
        messages.insert(
            ATTACHMENT_COUNT_KEY.to_string(),
            Message::Plural(
                attachment_count
                    .iter()
                    .map(|(form, text)| (*form, (*text).to_string()))
                    .collect(),
            ),
        );
        Self {
            summary: LocaleSummary {
                code: code.to_string(),
                display_name: display_name.to_string(),
            },
            plural_rules: plural_rules_for(code).ok().flatten(),
            messages,
        }
    }

    fn render<'a>(&'a self, key: &str, params: &LocalizationParams<'_>) -> Option<Cow<'a, str>> {
        let template = match self.messages.get(key)? {
            Message::Simple(text) => text.as_str(),
            Message::Plural(forms) => {
                let form = params
                    .count
                    .map(|count| plural_form(self.plural_rules.as_deref(), count))
                    .unwrap_or(PluralForm::Other);
                forms
                    .get(&form)
                    .or_else(|| forms.get(&PluralForm::Other))
                    .map(String::as_str)
                    .unwrap_or("")
            }
        };
        Some(fill_template(template, params))
    }
}

#[derive(Debug, Deserialize)]
struct LocaleFile {
    locale: String,
    #[serde(default)]
    display_name: Option<String>,
    #[serde(default)]
    strings: HashMap<String, LocaleEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum LocaleEntry {
    Simple(String),
    Plural(HashMap<String, String>),
}

/// 介面文字目錄；查無時回退至預設語系，再回退至鍵本身。
/// / Interface text catalogs. Lookups fall back to the default locale, then to the key.
#[derive(Debug, Clone)]
pub struct LocalizationManager {
    catalogs: Vec<Catalog>,
    active: usize,
}

impl Default for LocalizationManager {
    fn default() -> Self {
        Self::builtin()
    }
}

impl LocalizationManager {
    /// Built-in Portuguese (fallback) and English catalogs.
    pub fn builtin() -> Self {
        Self {
            catalogs: vec![
                Catalog::builtin(
                    DEFAULT_LOCALE_CODE,
                    DEFAULT_DISPLAY_NAME,
                    PORTUGUESE_STRINGS,
                    PORTUGUESE_ATTACHMENT_COUNT,
                ),
                Catalog::builtin(
                    ENGLISH_LOCALE_CODE,
                    ENGLISH_DISPLAY_NAME,
                    ENGLISH_STRINGS,
                    ENGLISH_ATTACHMENT_COUNT,
                ),
            ],
            active: 0,
        }
    }

    /// 從目錄載入額外的 `<code>.json` 語系檔；同代碼者覆寫內建字串。
    /// / Loads extra `<code>.json` catalogs. A file for an existing code overrides its entries.
    pub fn load_from_dir(path: impl AsRef<Path>) -> Result<Self, LocalizationError> {
        let mut manager = Self::builtin();
        manager.load_directory(path.as_ref())?;
        Ok(manager)
    }

    pub fn active_code(&self) -> &str {
        &self.catalogs[self.active].summary.code
    }

    pub fn locale_summaries(&self) -> Vec<LocaleSummary> {
        self.catalogs
            .iter()
            .map(|catalog| catalog.summary.clone())
            .collect()
    }

    /// Switches the active locale; unknown codes leave it unchanged.
    pub fn set_active_by_code(&mut self, code: &str) -> bool {
        match self
            .catalogs
            .iter()
            .position(|catalog| catalog.summary.code == code)
        {
            Some(index) => {
                self.active = index;
                true
            }
            None => false,
        }
    }

    pub fn text<'a>(&'a self, key: &'a str) -> Cow<'a, str> {
        self.text_with_params(key, &LocalizationParams::empty())
    }

    pub fn text_with_params<'a>(
        &'a self,
        key: &'a str,
        params: &LocalizationParams<'_>,
    ) -> Cow<'a, str> {
        self.catalogs[self.active]
            .render(key, params)
            .or_else(|| self.catalogs[0].render(key, params))
            .unwrap_or(Cow::Borrowed(key))
    }

    fn load_directory(&mut self, dir: &Path) -> Result<(), LocalizationError> {
        let entries = match fs::read_dir(dir) {
            Ok(entries) => entries,
            // No extra catalogs; built-ins remain.
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(()),
            Err(err) => return Err(LocalizationError::ReadDir(dir.to_path_buf(), err)),
        };

        let mut paths = Vec::new();
        for entry in entries {
            let path = entry
                .map_err(|err| LocalizationError::ReadDir(dir.to_path_buf(), err))?
                .path();
            if path.is_file() && path.extension().and_then(|ext| ext.to_str()) == Some("json") {
                paths.push(path);
            }
        }
        paths.sort();

        for path in paths {
            let contents = fs::read_to_string(&path)
                .map_err(|err| LocalizationError::ReadFile(path.clone(), err))?;
            let file: LocaleFile = serde_json::from_str(&contents)
                .map_err(|err| LocalizationError::ParseFile(path.clone(), err))?;
            self.merge_file(file)?;
        }
        Ok(())
    }

    fn merge_file(&mut self, file: LocaleFile) -> Result<(), LocalizationError> {
        let plural_rules = plural_rules_for(&file.locale)?;
        let messages = build_messages(&file.locale, file.strings)?;
        let display_name = file.display_name.unwrap_or_else(|| file.locale.clone());

        if let Some(existing) = self
            .catalogs
            .iter_mut()
            .find(|catalog| catalog.summary.code == file.locale)
        {
            existing.summary.display_name = display_name;
            existing.messages.extend(messages);
            return Ok(());
        }

        self.catalogs.push(Catalog {
            summary: LocaleSummary {
                code: file.locale,
                display_name,
            },
            plural_rules,
            messages,
        });
        Ok(())
    }
}

/// 驗證語系代碼格式。 / Validates a BCP-47 locale identifier.
pub fn validate_locale_code(code: &str) -> Result<(), LocalizationError> {
    Locale::from_str(code)
        .map(|_| ())
        .map_err(|error| LocalizationError::InvalidLocaleIdentifier {
            locale: code.to_string(),
            error,
        })
}

fn plural_rules_for(code: &str) -> Result<Option<Arc<PluralRules>>, LocalizationError> {
    let locale =
        Locale::from_str(code).map_err(|error| LocalizationError::InvalidLocaleIdentifier {
            locale: code.to_string(),
            error,
        })?;
    Ok(PluralRules::try_new_cardinal(&locale.into())
        .ok()
        .map(Arc::new))
}

fn build_messages(
    locale: &str,
    entries: HashMap<String, LocaleEntry>,
) -> Result<HashMap<String, Message>, LocalizationError> {
    let mut messages = HashMap::new();
    for (key, entry) in entries {
        let message = match entry {
            LocaleEntry::Simple(text) => Message::Simple(text),
            LocaleEntry::Plural(raw_forms) => {
                let mut forms = BTreeMap::new();
                for (category, template) in raw_forms {
                    if category == "type" {
                        continue;
                    }
                    let form = category.parse::<PluralForm>().map_err(|_| {
                        LocalizationError::InvalidPluralCategory {
                            locale: locale.to_string(),
                            key: key.clone(),
                            category: category.clone(),
                        }
                    })?;
                    forms.insert(form, template);
                }
                if !forms.contains_key(&PluralForm::Other) {
                    return Err(LocalizationError::PluralMissingOther {
                        locale: locale.to_string(),
                        key,
                    });
                }
                Message::Plural(forms)
            }
        };
        messages.insert(key, message);
    }
    Ok(messages)
}

fn plural_form(rules: Option<&PluralRules>, count: u64) -> PluralForm {
    match rules {
        Some(rules) => PluralForm::from(rules.category_for(count)),
        None if count == 1 => PluralForm::One,
        None => PluralForm::Other,
    }
}

fn fill_template<'a>(template: &'a str, params: &LocalizationParams<'_>) -> Cow<'a, str> {
    if !template.contains('{') {
        return Cow::Borrowed(template);
    }
    let mut rendered = template.to_string();
    if let Some(count) = params.count {
        rendered = rendered.replace("{count}", &count.to_string());
    }
    for (index, value) in params.positional.iter().enumerate() {
        rendered = rendered.replace(&format!("{{{index}}}"), value);
    }
    Cow::Owned(rendered)
}

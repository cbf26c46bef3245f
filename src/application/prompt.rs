//! Construcción de los prompts bilingües (amharico + inglés) para el modelo generativo.

use crate::domain::summary::{to_human_summary, DetectionSummary, Locale};

pub const SYSTEM_INSTRUCTIONS: &str = "\
አንተ የአማርኛ ቻትቦት ነህ። ሁሉንም መልስህን በአማርኛ በግእዝ ፊደል መመለስ አለብህ።
You are an Amharic chatbot. You must respond ONLY in Amharic using Ge'ez script.
Be friendly, helpful, and culturally appropriate for Ethiopian users.
If you receive information about detected objects in an image, describe them naturally in Amharic.";

pub const DETECTION_SECTION_HEADER: &str = "የምስል መረጃ (Image Detection Info):";
pub const USER_SECTION_HEADER: &str = "የተጠቃሚ መልእክት (User Message):";

pub const CLOSING_WITH_CONTEXT: &str =
    "እባክህ በአማርኛ ግልጽ እና ተፈጥሯዊ መልስ ስጥ። (Please respond in clear and natural Amharic.)";
pub const CLOSING_WITHOUT_CONTEXT: &str = "እባክህ በአማርኛ መልስ። (Please respond in Amharic.)";

pub const DESCRIPTION_HEADER: &str = "በምስሉ ውስጥ የሚከተሉት ነገሮች ተገኝተዋል፡";
pub const DESCRIPTION_REQUEST: &str = "\
እባክህ ይህንን በተፈጥሯዊ አማርኛ በግእዝ ፊደል ግለጽ። ምስሉን በአጭሩ ግለጽ።
Please describe this in natural Amharic using Ge'ez script. Give a brief description of what's in the image.";

#[derive(Debug, Clone, Copy, Default)]
pub struct PromptComposer;

impl PromptComposer {
    pub fn new() -> Self {
        Self
    }

    /// Prompt de chat. La sección de detecciones solo aparece si hay contexto no vacío.
    pub fn compose(&self, user_message: &str, detection_context: Option<&str>) -> String {
        match detection_context.map(str::trim).filter(|c| !c.is_empty()) {
            Some(context) => format!(
                "{SYSTEM_INSTRUCTIONS}\n\n{DETECTION_SECTION_HEADER} {context}\n\n{USER_SECTION_HEADER} {user_message}\n\n{CLOSING_WITH_CONTEXT}\n"
            ),
            None => format!(
                "{SYSTEM_INSTRUCTIONS}\n\n{USER_SECTION_HEADER} {user_message}\n\n{CLOSING_WITHOUT_CONTEXT}\n"
            ),
        }
    }

    pub fn compose_image_description_prompt(&self, summary: &DetectionSummary) -> String {
        let info = to_human_summary(summary, Locale::English);
        format!("{DESCRIPTION_HEADER}\n{info}\n\n{DESCRIPTION_REQUEST}\n")
    }
}

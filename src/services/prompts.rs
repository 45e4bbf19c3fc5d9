use crate::core::model::StoryMode;

pub const SCRIPT_SYSTEM_INSTRUCTION: &str = "أنت خبير في صناعة المحتوى الربحي على يوتيوب وبلوجر. هدفك إنتاج محتوى يتصدر النتائج ويجذب المعلنين.";

pub const ILLUSTRATION_STYLE: &str =
    "High-end 3D animation style, Disney/Pixar look, cinematic lighting, 8k resolution, masterpiece";

pub const NARRATION_STYLE: &str = "اقرأ بأسلوب حكواتي دافئ ومحترف";

pub const BLOG_PROMPT: &str = "أنشئ مقال بلوجر احترافي بـ SEO قوي حول قصص الأطفال والتربية. \
أنتج JSON يضم: title, content, tags, seo { keywords, description }.";

pub fn script_prompt(topic: &str, mode: StoryMode) -> String {
    format!(
        "أنشئ {} عن: \"{}\".\
        \nالجمهور المستهدف: {}.\
        \nأنتج JSON فقط يضم الحقول: title, targetAudience, moralOrLesson, scenes, monetization, youtubeData.\
        \n- scenes مصفوفة مرتبة، كل عنصر فيها: {{ \"title\", \"narration\", \"imagePrompt\", \"visualDescription\" }}.\
        \n- imagePrompt يُكتب بالإنجليزية ويصف المشهد بصرياً.\
        \n- monetization: {{ \"method\", \"suggestedProducts\": [...], \"estimatedCPM\", \"affiliateLinks\": [...] }} مع اقتراح منتجات أفلييت مناسبة وتقدير للأرباح.\
        \n- youtubeData: {{ \"title\", \"description\", \"tags\": [...], \"category\", \"thumbnailPrompt\" }} مع كلمات مفتاحية ذات CPM عالي.",
        mode.label(),
        topic,
        mode.audience(),
    )
}

pub fn illustration_prompt(prompt: &str) -> String {
    format!("{}: {}", ILLUSTRATION_STYLE, prompt)
}

pub fn narration_prompt(text: &str) -> String {
    format!("{}: {}", NARRATION_STYLE, text)
}

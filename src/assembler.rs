use crate::llm::TextGenerator;
use crate::models::{AnalysisRequest, KeywordResult, PageSpeedResult, RankResult, ReportMode};
use anyhow::Result;
use chrono::{DateTime, Local};

pub const HEADING_OVERVIEW: &str = "📊 GENEL SEO DURUMU";
pub const HEADING_PERFORMANCE: &str = "⚡ PERFORMANS ANALİZİ";
pub const HEADING_KEYWORD: &str = "🔍 ANAHTAR KELİME OPTİMİZASYONU";
pub const HEADING_RANK: &str = "📈 SERP SIRALAMASI";
pub const HEADING_SUGGESTIONS: &str = "🎯 İYİLEŞTİRME ÖNERİLERİ";
pub const HEADING_ACTION_PLAN: &str = "📋 EYLEM PLANI";

/// Report sections in the order both modes emit them.
pub const SECTION_HEADINGS: [&str; 6] = [
    HEADING_OVERVIEW,
    HEADING_PERFORMANCE,
    HEADING_KEYWORD,
    HEADING_RANK,
    HEADING_SUGGESTIONS,
    HEADING_ACTION_PLAN,
];

const NOT_AVAILABLE: &str = "N/A";

/// Everything one report is built from.
pub struct ReportInput<'a> {
    pub request: &'a AnalysisRequest,
    pub pagespeed: &'a PageSpeedResult,
    pub rank: &'a RankResult,
    pub keywords: &'a KeywordResult,
    pub generated_at: DateTime<Local>,
}

#[derive(Debug, Clone)]
pub struct AssembledReport {
    pub text: String,
    pub mode: ReportMode,
}

/// Turns the three analyzer results into one Markdown report.
///
/// With a generator configured the report is written by the model; without
/// one, or when the model call fails, the fixed template is rendered instead.
pub struct ReportAssembler {
    generator: Option<Box<dyn TextGenerator>>,
}

impl ReportAssembler {
    pub fn new(generator: Option<Box<dyn TextGenerator>>) -> Self {
        Self { generator }
    }

    pub fn template_only() -> Self {
        Self { generator: None }
    }

    pub fn is_generative(&self) -> bool {
        self.generator.is_some()
    }

    pub async fn assemble(&self, input: &ReportInput<'_>) -> AssembledReport {
        if let Some(generator) = &self.generator {
            match self.generate(generator.as_ref(), input).await {
                Ok(text) => {
                    return AssembledReport {
                        text,
                        mode: ReportMode::Generative,
                    };
                }
                Err(e) => {
                    tracing::warn!(
                        backend = %generator.name(),
                        error = %e,
                        "Generative report failed, falling back to template"
                    );
                }
            }
        } else {
            tracing::debug!("No generative backend configured, rendering template report");
        }

        AssembledReport {
            text: render_template(input),
            mode: ReportMode::Template,
        }
    }

    async fn generate(
        &self,
        generator: &dyn TextGenerator,
        input: &ReportInput<'_>,
    ) -> Result<String> {
        let prompt = build_prompt(input)?;
        tracing::info!(backend = %generator.name(), "Generating report with language model");
        generator.generate(&prompt).await
    }
}

/// Builds the Turkish-language prompt carrying all three payloads as JSON.
pub fn build_prompt(input: &ReportInput<'_>) -> Result<String> {
    let pagespeed = serde_json::to_string_pretty(input.pagespeed)?;
    let rank = serde_json::to_string_pretty(input.rank)?;
    let keywords = serde_json::to_string_pretty(input.keywords)?;

    let headings = SECTION_HEADINGS
        .iter()
        .enumerate()
        .map(|(i, heading)| format!("{}. {}", i + 1, heading))
        .collect::<Vec<_>>()
        .join("\n");

    Ok(format!(
        "Aşağıdaki SEO analiz verilerini kullanarak kapsamlı bir SEO raporu oluştur:

WEB SİTESİ: {url}
ANAHTAR KELİME: {keyword}
DOMAIN: {domain}

PAGESPEED VERİLERİ:
{pagespeed}

SERP VERİLERİ:
{rank}

KEYWORD ANALİZ VERİLERİ:
{keywords}

Lütfen aşağıdaki başlıklar altında detaylı bir SEO raporu oluştur:

{headings}

Raporu Türkçe olarak, emoji'lerle zenginleştirilmiş ve anlaşılır bir şekilde hazırla.
",
        url = input.request.url,
        keyword = input.request.keyword,
        domain = input.request.domain,
    ))
}

/// Renders the deterministic Markdown report.
pub fn render_template(input: &ReportInput<'_>) -> String {
    let request = input.request;
    let mut report = String::from("# 📊 SEO Analiz Raporu\n\n");

    report.push_str(&format!("## {}\n\n", HEADING_OVERVIEW));
    report.push_str(&format!("- **URL**: {}\n", request.url));
    report.push_str(&format!("- **Anahtar Kelime**: {}\n", request.keyword));
    report.push_str(&format!("- **Domain**: {}\n", request.domain));
    report.push_str(&format!(
        "- **Analiz Tarihi**: {}\n\n",
        input.generated_at.format("%Y-%m-%d %H:%M:%S")
    ));

    report.push_str(&format!("## {}\n\n", HEADING_PERFORMANCE));
    report.push_str(&performance_section(input.pagespeed));

    report.push_str(&format!("## {}\n\n", HEADING_KEYWORD));
    report.push_str(&keyword_section(input.keywords));

    report.push_str(&format!("## {}\n\n", HEADING_RANK));
    report.push_str(&rank_section(input.rank));

    report.push_str(&format!("## {}\n\n", HEADING_SUGGESTIONS));
    report.push_str(SUGGESTIONS);

    report.push_str(&format!("## {}\n\n", HEADING_ACTION_PLAN));
    report.push_str(ACTION_PLAN);

    report.push_str(FOOTER);
    report
}

fn unavailable(section: &str, error: &str) -> String {
    format!("### {}: Veri alınamadı\n\n- **Hata**: {}\n\n", section, error)
}

fn or_na(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or(NOT_AVAILABLE)
}

fn yes_no(value: bool) -> &'static str {
    if value { "Evet ✅" } else { "Hayır ❌" }
}

fn performance_section(result: &PageSpeedResult) -> String {
    let Some(metrics) = result.success() else {
        return unavailable("PageSpeed Analizi", result.error().unwrap_or_default());
    };

    let score = metrics
        .performance_score
        .map(|score| format!("{}/100", (score * 100.0).round()))
        .unwrap_or_else(|| NOT_AVAILABLE.to_string());

    format!(
        "### PageSpeed Insights Sonuçları:\n\n\
         - **Performans Skoru**: {}\n\
         - **İlk İçerik Boyama (FCP)**: {}\n\
         - **Hız İndeksi**: {}\n\
         - **En Büyük İçerik Boyama (LCP)**: {}\n\
         - **Toplam Engelleme Süresi (TBT)**: {}\n\
         - **Kümülatif Düzen Kayması (CLS)**: {}\n\n",
        score,
        or_na(&metrics.first_contentful_paint),
        or_na(&metrics.speed_index),
        or_na(&metrics.largest_contentful_paint),
        or_na(&metrics.total_blocking_time),
        or_na(&metrics.cumulative_layout_shift),
    )
}

fn keyword_section(result: &KeywordResult) -> String {
    let Some(metrics) = result.success() else {
        return unavailable("Anahtar Kelime Analizi", result.error().unwrap_or_default());
    };

    format!(
        "### Anahtar Kelime Analizi:\n\n\
         - **Anahtar Kelime**: {}\n\
         - **Toplam Kelime**: {}\n\
         - **Anahtar Kelime Sayısı**: {}\n\
         - **Anahtar Kelime Yoğunluğu**: %{:.2}\n\
         - **Başlık Uyumu**: {}\n\
         - **Meta Açıklama Uyumu**: {}\n\
         - **Okunabilirlik Skoru**: {:.2}\n\n",
        metrics.keyword,
        metrics.total_words,
        metrics.keyword_count,
        metrics.keyword_density_percent,
        yes_no(metrics.in_title),
        yes_no(metrics.in_meta_description),
        metrics.readability_score,
    )
}

fn rank_section(result: &RankResult) -> String {
    let Some(info) = result.success() else {
        return unavailable("SERP Analizi", result.error().unwrap_or_default());
    };

    let rank = match info.rank {
        Some(rank) => rank.to_string(),
        None => info
            .message
            .clone()
            .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
    };

    format!(
        "### SERP Analizi Sonuçları:\n\n\
         - **Anahtar Kelime**: {}\n\
         - **Domain**: {}\n\
         - **Sıralama**: {}\n\n",
        info.keyword, info.domain, rank,
    )
}

const SUGGESTIONS: &str = "### Genel SEO İyileştirmeleri:

1. **Sayfa Hızı**: Sayfa yükleme hızını artırın
2. **Mobil Uyumluluk**: Mobil cihazlarda iyi performans sağlayın
3. **Anahtar Kelime Optimizasyonu**: Başlık ve meta açıklamalarda anahtar kelimeyi kullanın
4. **İçerik Kalitesi**: Kaliteli ve özgün içerik oluşturun

### Teknik SEO:

1. **Meta Etiketleri**: Title ve description etiketlerini optimize edin
2. **URL Yapısı**: Temiz ve anlaşılır URL'ler kullanın
3. **İç Linkleme**: Site içi linkleme yapısını güçlendirin
4. **Dış Linkleme**: Kaliteli sitelerden backlink alın

";

const ACTION_PLAN: &str = "### Kısa Vadeli (1-2 Hafta):

- [ ] Sayfa hızı optimizasyonu
- [ ] Meta etiketlerin güncellenmesi
- [ ] Anahtar kelime yoğunluğunun kontrolü

### Orta Vadeli (1-2 Ay):

- [ ] İçerik kalitesinin artırılması
- [ ] Backlink stratejisinin geliştirilmesi
- [ ] Teknik SEO sorunlarının çözülmesi

### Uzun Vadeli (3-6 Ay):

- [ ] Site genelinde SEO optimizasyonu
- [ ] İçerik stratejisinin geliştirilmesi
- [ ] Performans takip sisteminin kurulması

";

const FOOTER: &str = "---\n\n*Bu rapor otomatik olarak oluşturulmuştur. Daha detaylı analiz için Gemini API anahtarınızı ayarlayın.*\n";

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{KeywordMetrics, PageSpeedMetrics, RankInfo, SectionResult};
    use async_trait::async_trait;
    use std::sync::{Arc, Mutex};

    fn request() -> AnalysisRequest {
        AnalysisRequest::new("https://example.com", "test", "example.com")
    }

    fn sample_pagespeed() -> PageSpeedResult {
        SectionResult::Success(PageSpeedMetrics {
            performance_score: Some(0.92),
            first_contentful_paint: Some("0.6 s".to_string()),
            speed_index: Some("1.1 s".to_string()),
            largest_contentful_paint: None,
            total_blocking_time: Some("30 ms".to_string()),
            cumulative_layout_shift: Some("0.01".to_string()),
        })
    }

    fn sample_rank() -> RankResult {
        SectionResult::Success(RankInfo {
            keyword: "test".to_string(),
            domain: "example.com".to_string(),
            rank: Some(3),
            message: None,
        })
    }

    fn sample_keywords() -> KeywordResult {
        SectionResult::Success(KeywordMetrics {
            keyword: "test".to_string(),
            total_words: 200,
            keyword_count: 4,
            keyword_density_percent: 2.0,
            in_title: true,
            in_meta_description: false,
            readability_score: 64.5,
        })
    }

    struct FixedGenerator {
        reply: Result<String, String>,
        prompts: Arc<Mutex<Vec<String>>>,
    }

    #[async_trait]
    impl TextGenerator for FixedGenerator {
        fn name(&self) -> &str {
            "fixed"
        }

        async fn generate(&self, prompt: &str) -> Result<String> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            self.reply.clone().map_err(|e| anyhow::anyhow!(e))
        }
    }

    #[test]
    fn test_template_contains_all_headings_and_request() {
        let request = request();
        let (pagespeed, rank, keywords) = (sample_pagespeed(), sample_rank(), sample_keywords());
        let input = ReportInput {
            request: &request,
            pagespeed: &pagespeed,
            rank: &rank,
            keywords: &keywords,
            generated_at: Local::now(),
        };

        let report = render_template(&input);
        for heading in SECTION_HEADINGS {
            assert!(report.contains(heading), "missing heading {}", heading);
        }
        assert!(report.contains("https://example.com"));
        assert!(report.contains("- **Anahtar Kelime**: test"));
        assert!(report.contains("- **Domain**: example.com"));
        assert!(report.contains("92/100"));
        assert!(report.contains("- **Sıralama**: 3"));
        assert!(report.contains("- **En Büyük İçerik Boyama (LCP)**: N/A"));
        assert!(report.contains("%2.00"));
    }

    #[test]
    fn test_template_marks_failed_sections_unavailable() {
        let request = request();
        let pagespeed: PageSpeedResult = SectionResult::failed("API error: 429");
        let rank: RankResult = SectionResult::failed("timeout");
        let keywords: KeywordResult = SectionResult::failed("connection refused");
        let input = ReportInput {
            request: &request,
            pagespeed: &pagespeed,
            rank: &rank,
            keywords: &keywords,
            generated_at: Local::now(),
        };

        let report = render_template(&input);
        assert!(report.contains("PageSpeed Analizi: Veri alınamadı"));
        assert!(report.contains("API error: 429"));
        assert!(report.contains("SERP Analizi: Veri alınamadı"));
        assert!(report.contains("Anahtar Kelime Analizi: Veri alınamadı"));
        for heading in SECTION_HEADINGS {
            assert!(report.contains(heading));
        }
    }

    #[test]
    fn test_prompt_embeds_payloads_and_headings() {
        let request = request();
        let (pagespeed, rank, keywords) = (sample_pagespeed(), sample_rank(), sample_keywords());
        let input = ReportInput {
            request: &request,
            pagespeed: &pagespeed,
            rank: &rank,
            keywords: &keywords,
            generated_at: Local::now(),
        };

        let prompt = build_prompt(&input).unwrap();
        assert!(prompt.contains("WEB SİTESİ: https://example.com"));
        assert!(prompt.contains("\"performance_score\": 0.92"));
        assert!(prompt.contains("\"rank\": 3"));
        assert!(prompt.contains("\"keyword_count\": 4"));
        assert!(prompt.contains("6. 📋 EYLEM PLANI"));
    }

    #[tokio::test]
    async fn test_generative_mode_returns_model_text_verbatim() {
        let prompts = Arc::new(Mutex::new(Vec::new()));
        let assembler = ReportAssembler::new(Some(Box::new(FixedGenerator {
            reply: Ok("## model report".to_string()),
            prompts: prompts.clone(),
        })));
        assert!(assembler.is_generative());

        let request = request();
        let (pagespeed, rank, keywords) = (sample_pagespeed(), sample_rank(), sample_keywords());
        let input = ReportInput {
            request: &request,
            pagespeed: &pagespeed,
            rank: &rank,
            keywords: &keywords,
            generated_at: Local::now(),
        };

        let report = assembler.assemble(&input).await;
        assert_eq!(report.mode, ReportMode::Generative);
        assert_eq!(report.text, "## model report");
        assert_eq!(prompts.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_generator_failure_falls_back_to_template() {
        let assembler = ReportAssembler::new(Some(Box::new(FixedGenerator {
            reply: Err("quota exceeded".to_string()),
            prompts: Arc::new(Mutex::new(Vec::new())),
        })));

        let request = request();
        let (pagespeed, rank, keywords) = (sample_pagespeed(), sample_rank(), sample_keywords());
        let input = ReportInput {
            request: &request,
            pagespeed: &pagespeed,
            rank: &rank,
            keywords: &keywords,
            generated_at: Local::now(),
        };

        let report = assembler.assemble(&input).await;
        assert_eq!(report.mode, ReportMode::Template);
        assert!(report.text.contains(HEADING_ACTION_PLAN));
        assert!(!report.text.contains("quota exceeded"));
    }

    #[tokio::test]
    async fn test_template_only_assembler() {
        let assembler = ReportAssembler::template_only();
        assert!(!assembler.is_generative());

        let request = request();
        let (pagespeed, rank, keywords) = (sample_pagespeed(), sample_rank(), sample_keywords());
        let input = ReportInput {
            request: &request,
            pagespeed: &pagespeed,
            rank: &rank,
            keywords: &keywords,
            generated_at: Local::now(),
        };

        let report = assembler.assemble(&input).await;
        assert_eq!(report.mode, ReportMode::Template);
        assert!(report.text.starts_with("# 📊 SEO Analiz Raporu"));
    }
}

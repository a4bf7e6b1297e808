use ella_core::Language;

/// One fallback rule: if any keyword occurs in the lowercased input, the
/// localized template is the answer. Rules are evaluated top to bottom and
/// the first match wins, so order is part of the contract.
struct FallbackRule {
    keywords: &'static [&'static str],
    en: &'static str,
    de: &'static str,
}

impl FallbackRule {
    fn text(&self, language: Language) -> &'static str {
        match language {
            Language::En => self.en,
            Language::De => self.de,
        }
    }
}

const RULES: &[FallbackRule] = &[
    FallbackRule {
        keywords: &["manufacturing"],
        en: "Our BAF platform excels in manufacturing environments! We can integrate your ERP \
             systems with production management tools, enabling real-time inventory tracking \
             and automated order processing.",
        de: "Unsere BAF-Plattform glänzt in Fertigungsumgebungen! Wir können Ihre ERP-Systeme \
             mit Produktionsmanagement-Tools verbinden und ermöglichen so Bestandsverfolgung in \
             Echtzeit und automatisierte Auftragsabwicklung.",
    },
    FallbackRule {
        keywords: &["crm", "customer"],
        en: "CRM integration is one of our specialties! Our BAF can connect Salesforce, \
             HubSpot, or any CRM with your existing systems to create seamless customer data \
             flows and automated workflows.",
        de: "CRM-Integration ist eine unserer Spezialitäten! Unser BAF kann Salesforce, HubSpot \
             oder jedes andere CRM mit Ihren bestehenden Systemen verbinden und so nahtlose \
             Kundendatenflüsse und automatisierte Abläufe schaffen.",
    },
    FallbackRule {
        keywords: &["sap"],
        en: "SAP integration is our forte! Our BAF can seamlessly connect SAP ERP with your \
             CRM, e-commerce platforms, and other business systems for complete data \
             synchronization.",
        de: "SAP-Integration ist unsere Stärke! Unser BAF verbindet SAP ERP nahtlos mit Ihrem \
             CRM, Ihren E-Commerce-Plattformen und weiteren Geschäftssystemen für eine \
             vollständige Datensynchronisation.",
    },
    FallbackRule {
        keywords: &["ecommerce", "shopify", "online store"],
        en: "E-commerce integration made easy! We can connect Shopify, WooCommerce, or any \
             e-commerce platform with your inventory management, accounting, and CRM systems.",
        de: "E-Commerce-Integration leicht gemacht! Wir verbinden Shopify, WooCommerce oder \
             jede andere E-Commerce-Plattform mit Ihrer Warenwirtschaft, Buchhaltung und Ihrem \
             CRM.",
    },
    FallbackRule {
        keywords: &["automation", "workflow"],
        en: "Business automation is at the heart of what we do! Our BAF creates intelligent \
             workflows that eliminate manual data entry and reduce errors across your entire \
             business ecosystem.",
        de: "Geschäftsautomatisierung ist der Kern unserer Arbeit! Unser BAF erstellt \
             intelligente Workflows, die manuelle Dateneingabe überflüssig machen und Fehler in \
             Ihrem gesamten Unternehmen reduzieren.",
    },
    FallbackRule {
        keywords: &["price", "cost"],
        en: "Our pricing is tailored to your specific integration needs. Let's discuss your \
             requirements in a free consultation to provide you with a customized quote that \
             fits your budget.",
        de: "Unsere Preise richten sich nach Ihren konkreten Integrationsanforderungen. Lassen \
             Sie uns Ihre Anforderungen in einer kostenlosen Beratung besprechen, damit wir \
             Ihnen ein passendes Angebot erstellen können.",
    },
    FallbackRule {
        keywords: &["demo", "show me"],
        en: "I'd love to show you our BAF in action! You can watch our intro video or book a \
             personalized demo where we'll show you exactly how our platform can transform \
             your business processes.",
        de: "Gerne zeige ich Ihnen unser BAF in Aktion! Sie können unser Einführungsvideo \
             ansehen oder eine persönliche Demo buchen, in der wir Ihnen genau zeigen, wie \
             unsere Plattform Ihre Geschäftsprozesse verändern kann.",
    },
    FallbackRule {
        keywords: &["hello", "hi", "hey"],
        en: "Hello! I'm Ella, your personal integration assistant. I'm here to help you \
             discover how com:con's Business Automation Framework (BAF) can streamline your \
             business operations. What would you like to know?",
        de: "Hallo! Ich bin Ella, Ihr persönlicher Integrations-Assistent. Ich helfe Ihnen \
             dabei zu entdecken, wie com:cons Business Automation Framework (BAF) Ihre \
             Geschäftsprozesse optimieren kann. Was möchten Sie wissen?",
    },
];

const GENERIC_EN: &str = "I'm here to help with all your automation and integration needs! Our \
                          BAF platform connects different business systems to eliminate manual \
                          work and improve efficiency. What specific challenge can I help you \
                          solve today?";
const GENERIC_DE: &str = "Ich helfe Ihnen gerne bei allen Automatisierungs- und \
                          Integrationsthemen! Unsere BAF-Plattform verbindet verschiedene \
                          Geschäftssysteme, um manuelle Arbeit zu vermeiden und die Effizienz \
                          zu steigern. Bei welcher Herausforderung kann ich Sie heute \
                          unterstützen?";

/// Deterministic responder used when no completion engine is reachable or
/// configured. Total: returns a non-empty answer for every input.
pub fn respond(input: &str, language: Language) -> String {
    let message = input.to_lowercase();

    for rule in RULES {
        if rule.keywords.iter().any(|keyword| message.contains(keyword)) {
            return rule.text(language).to_string();
        }
    }

    match language {
        Language::En => GENERIC_EN.to_string(),
        Language::De => GENERIC_DE.to_string(),
    }
}

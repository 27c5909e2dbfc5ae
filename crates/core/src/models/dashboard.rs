use chrono::Utc;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BusinessInfo {
    pub name: String,
    pub category: String,
    pub website: String,
    pub completion_date: String,
    pub data_completeness: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinancialMetrics {
    pub monthly_revenue: f64,
    pub revenue_per_customer: f64,
    pub customer_acquisition_cost: f64,
    pub estimated_customers: f64,
    pub profit_margin: f64,
    pub cash_flow_in: f64,
    pub cash_flow_out: f64,
    pub net_cash_flow: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerMetrics {
    pub retention_rate: f64,
    pub revenue_model: String,
    pub seasonality: String,
    pub top_customers: String,
    pub upsell_cross_sell: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GrowthMetrics {
    pub last_price_change: String,
    pub lead_generation: String,
    pub profit_barriers: String,
    pub opportunities: String,
    pub unit_economics: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperationalMetrics {
    pub direct_costs: String,
    pub operating_expenses: String,
    pub fastest_growing_expenses: String,
    pub waste_tracking: String,
    pub financial_tools: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SocialMedia {
    pub linkedin: String,
    pub twitter: String,
    pub instagram: String,
    pub facebook: String,
    pub tiktok_youtube: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reputation {
    pub yelp: String,
    pub google_business: String,
    pub glassdoor: String,
    pub app_store: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Analytics {
    pub google_analytics: String,
    pub seo_tools: String,
    pub ecommerce_platforms: String,
    pub ad_platforms: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertKind {
    Warning,
    Info,
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BusinessAlert {
    #[serde(rename = "type")]
    pub kind: AlertKind,
    pub title: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BusinessRecommendation {
    pub category: String,
    pub title: String,
    pub description: String,
}

/// Payload of `GET /api/dashboard-data`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardData {
    pub business_info: BusinessInfo,
    pub financial_metrics: FinancialMetrics,
    pub customer_metrics: CustomerMetrics,
    pub growth_metrics: GrowthMetrics,
    pub operational_metrics: OperationalMetrics,
    pub social_media: SocialMedia,
    pub reputation: Reputation,
    pub analytics: Analytics,
    pub health_score: f64,
    #[serde(default)]
    pub alerts: Vec<BusinessAlert>,
    #[serde(default)]
    pub recommendations: Vec<BusinessRecommendation>,
}

impl DashboardData {
    /// Static payload served when the backend cannot be reached
    pub fn fallback() -> Self {
        Self {
            business_info: BusinessInfo {
                name: "Your Business".to_string(),
                category: "Technology".to_string(),
                website: "https://yourbusiness.com".to_string(),
                completion_date: Utc::now().to_rfc3339(),
                data_completeness: 85.0,
            },
            financial_metrics: FinancialMetrics {
                monthly_revenue: 45000.0,
                revenue_per_customer: 500.0,
                customer_acquisition_cost: 150.0,
                estimated_customers: 90.0,
                profit_margin: 26.7,
                cash_flow_in: 60000.0,
                cash_flow_out: 45000.0,
                net_cash_flow: 15000.0,
            },
            customer_metrics: CustomerMetrics {
                retention_rate: 94.2,
                revenue_model: "subscriptions".to_string(),
                seasonality: "moderate".to_string(),
                top_customers: "Enterprise clients, SMBs".to_string(),
                upsell_cross_sell: "yes".to_string(),
            },
            growth_metrics: GrowthMetrics {
                last_price_change: "6 months ago".to_string(),
                lead_generation: "digital marketing".to_string(),
                profit_barriers: "High customer acquisition costs".to_string(),
                opportunities: "International expansion, new product lines".to_string(),
                unit_economics: "yes".to_string(),
            },
            operational_metrics: OperationalMetrics {
                direct_costs: "Server costs, third-party services".to_string(),
                operating_expenses: "Salaries, marketing, office rent".to_string(),
                fastest_growing_expenses: "Marketing and customer acquisition".to_string(),
                waste_tracking: "yes".to_string(),
                financial_tools: "QuickBooks, custom analytics".to_string(),
            },
            social_media: SocialMedia {
                linkedin: "https://linkedin.com/company/yourbusiness".to_string(),
                twitter: "@yourbusiness".to_string(),
                instagram: "@yourbusiness".to_string(),
                facebook: "https://facebook.com/yourbusiness".to_string(),
                tiktok_youtube: "https://youtube.com/yourbusiness".to_string(),
            },
            reputation: Reputation {
                yelp: "https://yelp.com/biz/yourbusiness".to_string(),
                google_business: "https://g.page/yourbusiness".to_string(),
                glassdoor: "https://glassdoor.com/company/yourbusiness".to_string(),
                app_store: "https://apps.apple.com/app/yourbusiness".to_string(),
            },
            analytics: Analytics {
                google_analytics: "GA4 implemented".to_string(),
                seo_tools: "SEMrush, Ahrefs".to_string(),
                ecommerce_platforms: "Shopify, WooCommerce".to_string(),
                ad_platforms: "Google Ads, Facebook Ads".to_string(),
            },
            health_score: 85.0,
            alerts: vec![BusinessAlert {
                kind: AlertKind::Warning,
                title: "Cash Flow Alert".to_string(),
                message: "Monitor your cash flow projections for Q3".to_string(),
            }],
            recommendations: vec![
                BusinessRecommendation {
                    category: "Growth".to_string(),
                    title: "Expand Social Media Presence".to_string(),
                    description: "Increase your social media presence to reach more customers"
                        .to_string(),
                },
                BusinessRecommendation {
                    category: "Operations".to_string(),
                    title: "Implement Advanced Analytics".to_string(),
                    description: "Use more sophisticated analytics tools for better insights"
                        .to_string(),
                },
            ],
        }
    }

    pub fn net_margin(&self) -> f64 {
        let inflow = self.financial_metrics.cash_flow_in;
        if inflow == 0.0 {
            0.0
        } else {
            self.financial_metrics.net_cash_flow / inflow * 100.0
        }
    }
}

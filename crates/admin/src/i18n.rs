//! Static UI string tables for the admin panel (English, French, Arabic).
//!
//! The chosen language is stored in the admin session. Arabic renders
//! right-to-left.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use luxeshopy_core::{Category, OrderStatus, PaymentStatus};

/// Admin UI language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    Fr,
    Ar,
}

impl Language {
    pub const ALL: [Self; 3] = [Self::En, Self::Fr, Self::Ar];

    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::En => "en",
            Self::Fr => "fr",
            Self::Ar => "ar",
        }
    }

    /// Name of the language in that language.
    #[must_use]
    pub const fn native_name(&self) -> &'static str {
        match self {
            Self::En => "English",
            Self::Fr => "Français",
            Self::Ar => "العربية",
        }
    }

    #[must_use]
    pub const fn is_rtl(&self) -> bool {
        matches!(self, Self::Ar)
    }

    /// `dir` attribute for the `<html>` element.
    #[must_use]
    pub const fn dir(&self) -> &'static str {
        if self.is_rtl() { "rtl" } else { "ltr" }
    }

    #[must_use]
    pub fn strings(&self) -> &'static Strings {
        match self {
            Self::En => &EN,
            Self::Fr => &FR,
            Self::Ar => &AR,
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "en" => Ok(Self::En),
            "fr" => Ok(Self::Fr),
            "ar" => Ok(Self::Ar),
            other => Err(format!("unsupported language: {other}")),
        }
    }
}

/// One language's UI strings.
#[derive(Debug)]
pub struct Strings {
    pub dashboard: &'static str,
    pub insights: &'static str,
    pub orders: &'static str,
    pub products: &'static str,
    pub customers: &'static str,
    pub invoices: &'static str,
    pub settings: &'static str,
    pub logout: &'static str,
    pub welcome_back: &'static str,
    pub total_revenue: &'static str,
    pub total_profit: &'static str,
    pub total_orders: &'static str,
    pub pending_orders: &'static str,
    pub total_products: &'static str,
    pub sales_trend: &'static str,
    pub recent_orders: &'static str,
    pub all_orders: &'static str,
    pub period_stats: &'static str,
    pub earnings: &'static str,
    pub order_id: &'static str,
    pub customer_name: &'static str,
    pub phone_number: &'static str,
    pub address: &'static str,
    pub date: &'static str,
    pub amount: &'static str,
    pub status: &'static str,
    pub payment: &'static str,
    pub actions: &'static str,
    pub view_details: &'static str,
    pub search: &'static str,
    pub total_spent: &'static str,
    pub last_order: &'static str,
    pub export_csv: &'static str,
    pub invoice_id: &'static str,
    pub download_invoice: &'static str,
    pub profit_margin: &'static str,
    pub estimated_profit: &'static str,
    pub status_distribution: &'static str,
    pub last_seven_days: &'static str,
    pub pending: &'static str,
    pub shipped: &'static str,
    pub delivered: &'static str,
    pub cancelled: &'static str,
    pub paid: &'static str,
    pub unpaid: &'static str,
    pub men: &'static str,
    pub women: &'static str,
    pub items: &'static str,
    pub quantity: &'static str,
    pub unit_price: &'static str,
    pub product_title: &'static str,
    pub product_price: &'static str,
    pub product_description: &'static str,
    pub product_cost_price: &'static str,
    pub product_compare_price: &'static str,
    pub product_sizes: &'static str,
    pub product_color: &'static str,
    pub category: &'static str,
    pub price_inventory: &'static str,
    pub provide_url: &'static str,
    pub select_image: &'static str,
    pub new_product: &'static str,
    pub edit_product: &'static str,
    pub save: &'static str,
    pub delete: &'static str,
    pub update: &'static str,
    pub language: &'static str,
    pub change_password: &'static str,
    pub current_password: &'static str,
    pub new_password: &'static str,
    pub notifications: &'static str,
    pub mark_all_read: &'static str,
    pub no_orders: &'static str,
    pub no_products: &'static str,
    pub no_customers: &'static str,
}

impl Strings {
    #[must_use]
    pub const fn order_status(&self, status: OrderStatus) -> &'static str {
        match status {
            OrderStatus::Pending => self.pending,
            OrderStatus::Shipped => self.shipped,
            OrderStatus::Delivered => self.delivered,
            OrderStatus::Cancelled => self.cancelled,
            OrderStatus::Paid => self.paid,
        }
    }

    #[must_use]
    pub const fn payment_status(&self, status: PaymentStatus) -> &'static str {
        match status {
            PaymentStatus::Paid => self.paid,
            PaymentStatus::Unpaid => self.unpaid,
        }
    }

    #[must_use]
    pub const fn category(&self, category: Category) -> &'static str {
        match category {
            Category::Men => self.men,
            Category::Women => self.women,
        }
    }
}

pub static EN: Strings = Strings {
    dashboard: "Dashboard",
    insights: "Insights",
    orders: "Orders",
    products: "Products",
    customers: "Customers",
    invoices: "Invoices",
    settings: "Settings",
    logout: "Logout",
    welcome_back: "Welcome back",
    total_revenue: "Total Revenue",
    total_profit: "Total Profit",
    total_orders: "Total Orders",
    pending_orders: "Pending Orders",
    total_products: "Total Products",
    sales_trend: "Sales Trend",
    recent_orders: "Recent Orders",
    all_orders: "All Orders",
    period_stats: "Detailed Statistics",
    earnings: "Earnings",
    order_id: "Order ID",
    customer_name: "Customer Name",
    phone_number: "Phone Number",
    address: "Address",
    date: "Date",
    amount: "Amount",
    status: "Status",
    payment: "Payment",
    actions: "Actions",
    view_details: "View Details",
    search: "Search",
    total_spent: "Total Spent",
    last_order: "Last Order",
    export_csv: "Export to Excel",
    invoice_id: "Invoice ID",
    download_invoice: "Download Invoice",
    profit_margin: "Profit Margin",
    estimated_profit: "Estimated Profit",
    status_distribution: "Order Status",
    last_seven_days: "Last 7 days",
    pending: "Pending",
    shipped: "Shipped",
    delivered: "Delivered",
    cancelled: "Cancelled",
    paid: "Paid",
    unpaid: "Unpaid",
    men: "Men",
    women: "Women",
    items: "Items",
    quantity: "Quantity",
    unit_price: "Unit Price",
    product_title: "Product Title",
    product_price: "Price (TND)",
    product_description: "Description",
    product_cost_price: "Cost Price (TND)",
    product_compare_price: "Compare-at Price (TND)",
    product_sizes: "Sizes (comma separated)",
    product_color: "Color",
    category: "Category",
    price_inventory: "Pricing",
    provide_url: "Image URL",
    select_image: "Upload Image",
    new_product: "New Product",
    edit_product: "Edit Product",
    save: "Save",
    delete: "Delete",
    update: "Update",
    language: "Language",
    change_password: "Change Password",
    current_password: "Current Password",
    new_password: "New Password",
    notifications: "Notifications",
    mark_all_read: "Mark all as read",
    no_orders: "No orders yet",
    no_products: "No products yet",
    no_customers: "No customers found",
};

pub static FR: Strings = Strings {
    dashboard: "Tableau de bord",
    insights: "Analyses",
    orders: "Commandes",
    products: "Produits",
    customers: "Clients",
    invoices: "Factures",
    settings: "Paramètres",
    logout: "Déconnexion",
    welcome_back: "Bon retour",
    total_revenue: "Revenu total",
    total_profit: "Bénéfice total",
    total_orders: "Total des commandes",
    pending_orders: "Commandes en attente",
    total_products: "Total des produits",
    sales_trend: "Tendance des ventes",
    recent_orders: "Commandes récentes",
    all_orders: "Toutes les commandes",
    period_stats: "Statistiques détaillées",
    earnings: "Gains",
    order_id: "N° de commande",
    customer_name: "Nom du client",
    phone_number: "Téléphone",
    address: "Adresse",
    date: "Date",
    amount: "Montant",
    status: "Statut",
    payment: "Paiement",
    actions: "Actions",
    view_details: "Voir les détails",
    search: "Rechercher",
    total_spent: "Total dépensé",
    last_order: "Dernière commande",
    export_csv: "Exporter vers Excel",
    invoice_id: "N° de facture",
    download_invoice: "Télécharger la facture",
    profit_margin: "Marge bénéficiaire",
    estimated_profit: "Bénéfice estimé",
    status_distribution: "Statut des commandes",
    last_seven_days: "7 derniers jours",
    pending: "En attente",
    shipped: "Expédiée",
    delivered: "Livrée",
    cancelled: "Annulée",
    paid: "Payée",
    unpaid: "Non payée",
    men: "Hommes",
    women: "Femmes",
    items: "Articles",
    quantity: "Quantité",
    unit_price: "Prix unitaire",
    product_title: "Titre du produit",
    product_price: "Prix (TND)",
    product_description: "Description",
    product_cost_price: "Prix de revient (TND)",
    product_compare_price: "Prix barré (TND)",
    product_sizes: "Pointures (séparées par des virgules)",
    product_color: "Couleur",
    category: "Catégorie",
    price_inventory: "Tarification",
    provide_url: "URL de l'image",
    select_image: "Téléverser une image",
    new_product: "Nouveau produit",
    edit_product: "Modifier le produit",
    save: "Enregistrer",
    delete: "Supprimer",
    update: "Mettre à jour",
    language: "Langue",
    change_password: "Changer le mot de passe",
    current_password: "Mot de passe actuel",
    new_password: "Nouveau mot de passe",
    notifications: "Notifications",
    mark_all_read: "Tout marquer comme lu",
    no_orders: "Aucune commande pour le moment",
    no_products: "Aucun produit pour le moment",
    no_customers: "Aucun client trouvé",
};

pub static AR: Strings = Strings {
    dashboard: "لوحة التحكم",
    insights: "التحليلات",
    orders: "الطلبات",
    products: "المنتجات",
    customers: "العملاء",
    invoices: "الفواتير",
    settings: "الإعدادات",
    logout: "تسجيل الخروج",
    welcome_back: "مرحبًا بعودتك",
    total_revenue: "إجمالي الإيرادات",
    total_profit: "إجمالي الربح",
    total_orders: "إجمالي الطلبات",
    pending_orders: "الطلبات المعلقة",
    total_products: "إجمالي المنتجات",
    sales_trend: "اتجاه المبيعات",
    recent_orders: "أحدث الطلبات",
    all_orders: "جميع الطلبات",
    period_stats: "إحصائيات مفصلة",
    earnings: "الأرباح",
    order_id: "رقم الطلب",
    customer_name: "اسم العميل",
    phone_number: "رقم الهاتف",
    address: "العنوان",
    date: "التاريخ",
    amount: "المبلغ",
    status: "الحالة",
    payment: "الدفع",
    actions: "الإجراءات",
    view_details: "عرض التفاصيل",
    search: "بحث",
    total_spent: "إجمالي الإنفاق",
    last_order: "آخر طلب",
    export_csv: "تصدير إلى Excel",
    invoice_id: "رقم الفاتورة",
    download_invoice: "تحميل الفاتورة",
    profit_margin: "هامش الربح",
    estimated_profit: "الربح المقدر",
    status_distribution: "حالة الطلبات",
    last_seven_days: "آخر 7 أيام",
    pending: "قيد الانتظار",
    shipped: "تم الشحن",
    delivered: "تم التسليم",
    cancelled: "ملغى",
    paid: "مدفوع",
    unpaid: "غير مدفوع",
    men: "رجال",
    women: "نساء",
    items: "المنتجات",
    quantity: "الكمية",
    unit_price: "سعر الوحدة",
    product_title: "اسم المنتج",
    product_price: "السعر (د.ت)",
    product_description: "الوصف",
    product_cost_price: "سعر التكلفة (د.ت)",
    product_compare_price: "السعر قبل الخصم (د.ت)",
    product_sizes: "المقاسات (مفصولة بفواصل)",
    product_color: "اللون",
    category: "الفئة",
    price_inventory: "التسعير",
    provide_url: "رابط الصورة",
    select_image: "رفع صورة",
    new_product: "منتج جديد",
    edit_product: "تعديل المنتج",
    save: "حفظ",
    delete: "حذف",
    update: "تحديث",
    language: "اللغة",
    change_password: "تغيير كلمة المرور",
    current_password: "كلمة المرور الحالية",
    new_password: "كلمة المرور الجديدة",
    notifications: "الإشعارات",
    mark_all_read: "تحديد الكل كمقروء",
    no_orders: "لا توجد طلبات بعد",
    no_products: "لا توجد منتجات بعد",
    no_customers: "لم يتم العثور على عملاء",
};

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_language() {
        assert_eq!("FR".parse::<Language>().unwrap(), Language::Fr);
        assert_eq!(" ar ".parse::<Language>().unwrap(), Language::Ar);
        assert!("de".parse::<Language>().is_err());
    }

    #[test]
    fn test_only_arabic_is_rtl() {
        assert_eq!(Language::Ar.dir(), "rtl");
        assert_eq!(Language::En.dir(), "ltr");
        assert_eq!(Language::Fr.dir(), "ltr");
    }

    #[test]
    fn test_tables_are_distinct() {
        assert_eq!(Language::En.strings().orders, "Orders");
        assert_eq!(Language::Fr.strings().orders, "Commandes");
        assert_eq!(Language::Ar.strings().orders, "الطلبات");
        assert_eq!(
            Language::Fr.strings().order_status(OrderStatus::Cancelled),
            "Annulée"
        );
    }
}

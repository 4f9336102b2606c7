//! Built-in training dialogs and keyword map.

/// `(input, output, intent)` sample dialogs.
pub const SAMPLE_DIALOGS: &[(&str, &str, &str)] = &[
    ("Hello", "Hi there! How can I help you today?", "greeting"),
    ("Hi", "Hello! Welcome to our customer support. What can I assist you with?", "greeting"),
    ("Good morning", "Good morning! How can I make your day better today?", "greeting"),
    ("Hey there", "Hey! I'm here to help. What questions do you have?", "greeting"),
    ("Where is my order?", "I can help you track your order! Please provide your order number and I'll check the status for you.", "order_status"),
    ("Order status", "To check your order status, please provide your order number.", "order_status"),
    ("Track my package", "I'd be happy to help you track your package. What's your order number?", "order_status"),
    ("Is my order shipped?", "Let me check your order status. Please provide your order number.", "order_status"),
    ("How long does shipping take?", "We offer standard shipping (3-5 business days) and express shipping (1-2 business days). Which option would you like to know more about?", "shipping"),
    ("Shipping time", "Shipping times vary. Standard delivery is 3-5 days, express is 1-2 days.", "shipping"),
    ("When will it arrive?", "Our shipping options are standard (3-5 days) and express (1-2 days).", "shipping"),
    ("Delivery time", "We have two shipping options: standard (3-5 days) and express (1-2 days). Which would you prefer?", "shipping"),
    ("I want to return this", "We offer a 30-day return policy. Items must be in original condition with packaging. Would you like me to help you start a return?", "returns"),
    ("Return policy", "Returns are accepted within 30 days of purchase. Please keep your receipt and original packaging.", "returns"),
    ("How do I return?", "You can return items within 30 days for a full refund. Do you need assistance with the return process?", "returns"),
    ("Refund", "Our return policy allows returns within 30 days. Items must be in original condition.", "returns"),
    ("What payment methods do you accept?", "We accept all major credit cards, PayPal, and bank transfers. How can I help with your payment?", "payment"),
    ("Payment options", "You can pay with Visa, MasterCard, American Express, PayPal, or bank transfer.", "payment"),
    ("How can I pay?", "Multiple payment methods are available, including credit cards and PayPal.", "payment"),
    ("Billing", "I can help with billing questions. What specific payment issue can I assist with?", "payment"),
    ("Tell me about this product", "I'd be happy to help with product information. Which product are you interested in?", "product_info"),
    ("Product details", "Let me get you the details on that product. What specific information do you need?", "product_info"),
    ("Specifications", "I can provide product specifications and availability. What product are you asking about?", "product_info"),
    ("Is this in stock?", "Let me check the availability for you. Which product are you interested in?", "product_info"),
    ("How can I contact support?", "You can reach our support team at support@company.com or call 1-800-SUPPORT. Our team is available 24/7!", "contact"),
    ("Phone number", "For immediate assistance, call us at 1-800-SUPPORT or email support@company.com.", "contact"),
    ("Email support", "Our support team is available 24/7. Call 1-800-SUPPORT or email support@company.com.", "contact"),
    ("Speak to someone", "I can help you with most questions, but if you need to speak to a human agent, call 1-800-SUPPORT.", "contact"),
    ("I have a complaint", "I'm sorry to hear you're having an issue. Please tell me more about the problem so I can help resolve it.", "complaint"),
    ("This is terrible", "I understand your frustration. Let me help you resolve this issue. What specific problem are you experiencing?", "complaint"),
    ("I'm not happy", "I'm sorry you're not satisfied. Please share the details of your concern so I can assist you better.", "complaint"),
    ("This is unacceptable", "I apologize for the inconvenience. Let me help you address this issue. What happened?", "complaint"),
    ("Thanks for your help", "You're welcome! Is there anything else I can help you with?", "goodbye"),
    ("Thank you", "You're welcome! Feel free to reach out if you need any more assistance.", "goodbye"),
    ("Bye", "Goodbye! Have a great day!", "goodbye"),
    ("See you later", "See you later! Take care!", "goodbye"),
];

/// Keyword map consulted by the dataset matcher.
pub const KEYWORD_MAP: &[(&str, &[&str])] = &[
    ("greeting", &["hello", "hi", "hey", "good morning", "good afternoon", "good evening"]),
    ("goodbye", &["bye", "goodbye", "see you", "farewell", "take care"]),
    ("thanks", &["thank you", "thanks", "appreciate", "grateful"]),
    ("order_status", &["order", "status", "tracking", "shipped", "delivery", "where is my order"]),
    ("shipping", &["shipping", "delivery", "shipping time", "how long", "when will it arrive"]),
    ("returns", &["return", "refund", "exchange", "cancel", "return policy"]),
    ("payment", &["payment", "billing", "charge", "credit card", "payment method", "invoice"]),
    ("product_info", &["product", "specifications", "features", "size", "color", "availability"]),
    ("contact", &["contact", "phone", "email", "support", "help", "speak to someone"]),
    ("complaint", &["complaint", "problem", "issue", "unhappy", "dissatisfied", "angry"]),
];

//! Common test utilities for building workflow documents.
use flowpatch::prelude::*;

/// Two unconnected nodes, `A` (id `a`) and `B` (id `b`).
#[allow(dead_code)]
pub fn create_pair_document() -> WorkflowDocument {
    let mut doc = WorkflowDocument::new();
    doc.append_node(Node::new("a", "A", "n8n-nodes-base.code"))
        .expect("append A");
    doc.append_node(Node::new("b", "B", "n8n-nodes-base.code"))
        .expect("append B");
    doc
}

#[allow(dead_code)]
pub fn load_clinic_bot() -> WorkflowDocument {
    WorkflowDocument::from_json_str(CLINIC_BOT_JSON).expect("Failed to parse clinic bot fixture")
}

#[allow(dead_code)]
pub fn path(raw: &str) -> FieldPath {
    raw.parse().expect("Invalid field path in test")
}

/// Node ids of the clinic bot fixture, in document order.
#[allow(dead_code)]
pub const CLINIC_BOT_IDS: [&str; 9] = [
    "webhook",
    "extract-data",
    "intent-router",
    "ai-agent",
    "openai-model",
    "chat-memory",
    "send-reply",
    "book-appointment",
    "analytics",
];

/// A trimmed-down chatbot workflow: a webhook feeding a code node, a four-way intent
/// router, an AI agent with model and memory side channels, and a few leaf actions.
#[allow(dead_code)]
pub const CLINIC_BOT_JSON: &str = r#"{
  "name": "Clinic Bot",
  "nodes": [
    {
      "parameters": {
        "httpMethod": "POST",
        "path": "whatsapp"
      },
      "id": "webhook",
      "name": "Webhook",
      "type": "n8n-nodes-base.webhook",
      "typeVersion": 2,
      "webhookId": "b5d1c1a0",
      "position": [0, 300]
    },
    {
      "parameters": {
        "jsCode": "const body = $input.first().json.body;\nreturn [{ json: { text: body.text } }];"
      },
      "id": "extract-data",
      "name": "Extract Data",
      "type": "n8n-nodes-base.code",
      "typeVersion": 2,
      "position": [220, 300]
    },
    {
      "parameters": {
        "rules": {
          "values": [
            { "outputKey": "schedule" },
            { "outputKey": "cancel" },
            { "outputKey": "question" },
            { "outputKey": "other" }
          ]
        }
      },
      "id": "intent-router",
      "name": "Intent Router",
      "type": "n8n-nodes-base.switch",
      "typeVersion": 3,
      "position": [440, 300]
    },
    {
      "parameters": {
        "promptType": "define"
      },
      "id": "ai-agent",
      "name": "AI Agent",
      "type": "@n8n/n8n-nodes-langchain.agent",
      "typeVersion": 1.7,
      "position": [660, 200]
    },
    {
      "parameters": {
        "model": "gpt-4o-mini"
      },
      "id": "openai-model",
      "name": "OpenAI Chat Model",
      "type": "@n8n/n8n-nodes-langchain.lmChatOpenAi",
      "typeVersion": 1,
      "credentials": {
        "openAiApi": { "id": "cred-1", "name": "OpenAI" }
      },
      "position": [600, 420]
    },
    {
      "parameters": {},
      "id": "chat-memory",
      "name": "Chat Memory",
      "type": "@n8n/n8n-nodes-langchain.memoryBufferWindow",
      "typeVersion": 1.3,
      "position": [720, 420]
    },
    {
      "parameters": {
        "jsCode": "return items;"
      },
      "id": "send-reply",
      "name": "Send Reply",
      "type": "n8n-nodes-base.code",
      "typeVersion": 2,
      "position": [880, 300]
    },
    {
      "parameters": {
        "url": "https://example.invalid/appointments"
      },
      "id": "book-appointment",
      "name": "Book Appointment",
      "type": "n8n-nodes-base.httpRequest",
      "typeVersion": 4.2,
      "position": [660, 400]
    },
    {
      "parameters": {
        "jsCode": "trackEvent('message');\nreturn items;"
      },
      "id": "analytics",
      "name": "Analytics",
      "type": "n8n-nodes-base.code",
      "typeVersion": 2,
      "position": [880, 500]
    }
  ],
  "connections": {
    "Webhook": {
      "main": [[{ "node": "Extract Data", "type": "main", "index": 0 }]]
    },
    "Extract Data": {
      "main": [[{ "node": "Intent Router", "type": "main", "index": 0 }]]
    },
    "Intent Router": {
      "main": [
        [{ "node": "Book Appointment", "type": "main", "index": 0 }],
        [{ "node": "Book Appointment", "type": "main", "index": 0 }],
        [{ "node": "AI Agent", "type": "main", "index": 0 }],
        [{ "node": "AI Agent", "type": "main", "index": 0 }]
      ]
    },
    "AI Agent": {
      "main": [[{ "node": "Send Reply", "type": "main", "index": 0 }]]
    },
    "OpenAI Chat Model": {
      "ai_languageModel": [[{ "node": "AI Agent", "type": "ai_languageModel", "index": 0 }]]
    },
    "Chat Memory": {
      "ai_memory": [[{ "node": "AI Agent", "type": "ai_memory", "index": 0 }]]
    },
    "Book Appointment": {
      "main": [[{ "node": "Send Reply", "type": "main", "index": 0 }]]
    },
    "Send Reply": {
      "main": [[{ "node": "Analytics", "type": "main", "index": 0 }]]
    }
  },
  "active": false,
  "settings": {
    "executionOrder": "v1"
  },
  "versionId": "0b6f3c1e",
  "meta": {
    "instanceId": "abc123"
  },
  "tags": []
}"#;

/// The rule set the clinic bot fixture satisfies.
#[allow(dead_code)]
pub fn clinic_bot_rules() -> ValidationRules {
    ValidationRules::new()
        .router_with_targets(
            "Intent Router",
            &["Book Appointment", "Book Appointment", "AI Agent", "AI Agent"],
        )
        .expect_edge("Webhook", "Extract Data")
        .expect_edge("Extract Data", "Intent Router")
        .expect_edge("AI Agent", "Send Reply")
        .side_channel("AI Agent", "OpenAI Chat Model", "ai_languageModel")
        .side_channel("AI Agent", "Chat Memory", "ai_memory")
}

/// A two-node workflow whose nodes use the exporter's own key order
/// (`parameters, type, typeVersion, position, id, name, ...`).
#[allow(dead_code)]
pub const EXPORT_ORDER_JSON: &str = r#"{
  "name": "Export Order",
  "nodes": [
    {
      "parameters": {
        "httpMethod": "POST",
        "path": "inbound"
      },
      "type": "n8n-nodes-base.webhook",
      "typeVersion": 2,
      "position": [0, 0],
      "id": "webhook",
      "name": "Webhook",
      "webhookId": "7f3a9c2e"
    },
    {
      "type": "n8n-nodes-base.noOp",
      "typeVersion": 1,
      "position": [220, 0],
      "id": "done",
      "name": "Done"
    }
  ],
  "connections": {
    "Webhook": {
      "main": [
        [
          {
            "node": "Done",
            "type": "main",
            "index": 0
          }
        ]
      ]
    }
  }
}
"#;

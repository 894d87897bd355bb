//! Stage task messages, carryovers and summary prompts

use super::{PromptTemplate, keys};
use crate::error::Result;

/// Pricing task, rendered with `date` and `assets`
pub fn pricing() -> Result<PromptTemplate> {
    PromptTemplate::new(
        keys::TASK_PRICING,
        "Today is the {{ date }}.
What are the current stock prices of {{ assets }}, and how is the performance over the past 6 months in terms of percentage change?
Start by retrieving the full name of each stock and use it for all future requests.
Prepare a figure of the normalized price of these stocks and save it to a file named normalized_prices.png. Include information about, if applicable:
* P/E ratio
* Forward P/E
* Dividends
* Price to book
* Debt/Eq
* ROE
* Analyze the correlation between the stocks
Do not use a solution that requires an API key.
If some of the data does not make sense, such as a price of 0, change the query and re-try.",
    )
}

pub fn news() -> Result<PromptTemplate> {
    PromptTemplate::new(
        keys::TASK_NEWS,
        "Investigate possible reasons of the stock performance leveraging market news headlines \
from Bing News or Google Search. Retrieve news headlines using python and return them. Use the \
full name stocks to retrieve headlines. Retrieve at least 10 headlines per stock. Do not use a \
solution that requires an API key. Do not perform a sentiment analysis.",
    )
}

pub fn writing() -> Result<PromptTemplate> {
    PromptTemplate::new(
        keys::TASK_WRITING,
        "Develop an engaging financial report using all information provided, include the normalized_prices.png figure, and other figures if provided.
Mainly rely on the information provided.
Create a table comparing all the fundamental ratios and data.
Provide comments and description of all the fundamental ratios and data.
Compare the stocks, consider their correlation and risks, provide a comparative analysis of the stocks.
Provide a summary of the recent news about each stock.
Ensure that you comment and summarize the news headlines for each stock, provide a comprehensive analysis of the news.
Provide connections between the news headlines provided and the fundamental ratios.
Provide an analysis of possible future scenarios.",
    )
}

/// Original task followed by the problems found in the previous attempt,
/// rendered with `task` and `issues`
pub fn retry() -> Result<PromptTemplate> {
    PromptTemplate::new(
        keys::TASK_RETRY,
        "{{ task }}

Previous attempt problems:
{% for issue in issues %}- {{ issue }}
{% endfor %}",
    )
}

pub fn pricing_carryover() -> Result<PromptTemplate> {
    PromptTemplate::new(
        keys::CARRYOVER_PRICING,
        "Wait for confirmation of code execution before terminating the conversation. Verify \
that the data is not completely composed of NaN values. Reply TERMINATE in the end when \
everything is done.",
    )
}

pub fn news_carryover() -> Result<PromptTemplate> {
    PromptTemplate::new(
        keys::CARRYOVER_NEWS,
        "Wait for confirmation of code execution before terminating the conversation. Reply \
TERMINATE in the end when everything is done.",
    )
}

pub fn writing_carryover() -> Result<PromptTemplate> {
    PromptTemplate::new(
        keys::CARRYOVER_WRITING,
        "I want to include a figure and a table of the provided data in the financial report.",
    )
}

pub fn pricing_summary() -> Result<PromptTemplate> {
    PromptTemplate::new(
        keys::SUMMARY_PRICING,
        "Return the stock prices of the stocks, their performance and all other metrics into a \
JSON object only. Provide the name of all figure files created. Provide the full name of each stock.",
    )
}

pub fn news_summary() -> Result<PromptTemplate> {
    PromptTemplate::new(
        keys::SUMMARY_NEWS,
        "Provide the news headlines as a paragraph for each stock, be precise but do not consider \
news events that are vague, return the result as a JSON object only.",
    )
}

pub fn review_summary() -> Result<PromptTemplate> {
    PromptTemplate::new(
        keys::SUMMARY_REVIEW,
        finsight_workflow::REVIEW_SUMMARY_PROMPT,
    )
}

pub fn legal_review_summary() -> Result<PromptTemplate> {
    PromptTemplate::new(
        keys::SUMMARY_LEGAL_REVIEW,
        "Return review into a JSON object only: {'Reviewer': '', 'Review': ''}.",
    )
}

pub fn meta_review() -> Result<PromptTemplate> {
    PromptTemplate::new(keys::TASK_META_REVIEW, finsight_workflow::META_REVIEW_MESSAGE)
}
